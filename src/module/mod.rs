pub mod aprs;
pub mod bridge;
pub mod scheduled;
pub mod wiresx;
