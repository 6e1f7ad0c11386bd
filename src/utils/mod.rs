// Utility functions
pub mod csv;
pub mod error;
pub mod validation;
