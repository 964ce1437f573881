// patient_records_api lib.rs
//
// HTTP surface of the patient records service: handlers, public
// entities and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
