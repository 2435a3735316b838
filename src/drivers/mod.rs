//! Input drivers built on `embedded-hal` pin traits.

pub mod button;
