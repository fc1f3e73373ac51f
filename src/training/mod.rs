/// Training layer: request snapshot, transport, response decoding, and the
/// single-flight orchestrator.
///
/// ```text
///  Selection + Dataset ──▶ orchestrator::begin ──▶ TrainingRequest
///                                                      │
///                                   client (POST /generate, multipart)
///                                                      │
///  ResultPresenter ◀── orchestrator::finish ◀── response::decode
/// ```

pub mod client;
pub mod orchestrator;
pub mod request;
pub mod response;
