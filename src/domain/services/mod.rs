//! Pure domain services.

pub mod result_mapper;
