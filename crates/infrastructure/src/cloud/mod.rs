mod client;

pub use client::WirelessTagClient;
