//! Story parameter form.
//!
//! [`ParameterForm`] keeps the user's generation options valid against the
//! active [`ModelProfile`](crate::models::ModelProfile) and produces one
//! [`GenerationRequest`](crate::story::GenerationRequest) per submission.

mod controller;

pub use controller::{run_submission, FormState, ParameterForm, SubmitTicket};
