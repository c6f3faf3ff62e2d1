//! Price sources: the Yahoo chart API and a seeded synthetic generator.

pub mod sample;
pub mod yahoo;

pub use sample::generate_prices;
pub use yahoo::YahooClient;
