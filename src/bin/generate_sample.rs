use std::path::PathBuf;

use anyhow::Context;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ROWS: usize = 300;
const REGIONS: [&str; 3] = ["north", "south", "west"];

/// One synthetic customer; `target` is 1 when the logistic score crosses 0.5.
fn sample_row(rng: &mut SimpleRng, id: usize) -> [String; 7] {
    let age = rng.gauss(42.0, 12.0).clamp(18.0, 90.0).round() as i64;
    let income = rng.gauss(52_000.0, 15_000.0).max(8_000.0);
    let tenure = rng.gauss(4.0, 2.5).max(0.0);
    let region = rng.pick(&REGIONS);
    let premium = rng.next_f64() < 0.3;

    let region_bias = match region {
        "north" => 0.4,
        "south" => -0.3,
        _ => 0.0,
    };
    let score = -4.0 + 0.03 * age as f64 + income / 40_000.0 + 0.25 * tenure
        + region_bias
        + if premium { 0.8 } else { 0.0 }
        + rng.gauss(0.0, 0.6);
    let target = u8::from(1.0 / (1.0 + (-score).exp()) > 0.5);

    [
        id.to_string(),
        age.to_string(),
        format!("{income:.2}"),
        format!("{tenure:.1}"),
        region.to_string(),
        premium.to_string(),
        target.to_string(),
    ]
}

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data.csv"));

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    writer.write_record(["customer_id", "age", "income", "tenure_years", "region", "premium", "target"])?;

    let mut positives = 0;
    for id in 0..ROWS {
        let row = sample_row(&mut rng, id);
        if row[6] == "1" {
            positives += 1;
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!(
        "Wrote {ROWS} rows ({positives} positive) to {}",
        output_path.display()
    );
    Ok(())
}
