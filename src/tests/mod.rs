mod common;
mod transport_modes;
