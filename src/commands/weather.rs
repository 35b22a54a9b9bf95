//! Weather command
//!
//! Weather is canned: the first query for a city generates a random
//! record and caches it under `weather:<city>` forever; every later
//! query returns the cached record unchanged.

use super::{ChatCommand, CommandContext};
use crate::store::Store;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

const DESCRIPTIONS: [&str; 7] = [
    "Sunny", "Cloudy", "Rainy", "Stormy", "Snowy", "Windy", "Foggy",
];

/// Key of the cached weather record for `city`.
pub fn weather_key(city: &str) -> String {
    format!("weather:{}", city)
}

/// A city's canned weather, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Degrees Celsius, in [-10, 40]
    pub temperature: i64,

    /// Percent, in [30, 100]
    pub humidity: i64,

    pub description: String,
}

impl WeatherRecord {
    /// Generate a fresh record.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        WeatherRecord {
            temperature: rng.gen_range(-10..=40),
            humidity: rng.gen_range(30..=100),
            description: DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())].to_string(),
        }
    }

    pub fn render(&self, city: &str) -> String {
        format!(
            "Weather in {}: {}°C, {}% humidity, {}",
            city, self.temperature, self.humidity, self.description
        )
    }
}

/// `!weather <city>` - look up or lazily generate the city's record
pub struct WeatherCommand;

#[async_trait(?Send)]
impl ChatCommand for WeatherCommand {
    async fn execute(&self, ctx: &mut CommandContext<'_>, args: &[&str]) -> Result<Vec<String>> {
        let city = args[0];
        let key = weather_key(city);

        let record = match ctx.store.get(&key).await? {
            Some(stored) => serde_json::from_slice(&stored)?,
            None => {
                let record = WeatherRecord::generate(&mut rand::thread_rng());
                ctx.store.set(&key, &serde_json::to_vec(&record)?).await?;
                record
            }
        };

        Ok(vec![record.render(city)])
    }

    fn name(&self) -> &'static str {
        "!weather"
    }

    fn min_args(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Session;
    use crate::store::MemoryStore;

    #[test]
    fn test_generate_stays_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let record = WeatherRecord::generate(&mut rng);
            assert!((-10..=40).contains(&record.temperature));
            assert!((30..=100).contains(&record.humidity));
            assert!(DESCRIPTIONS.contains(&record.description.as_str()));
        }
    }

    #[tokio::test]
    async fn test_weather_is_cached_on_first_read() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();

        let first = {
            let mut ctx = CommandContext::new(&mut store, &mut session);
            WeatherCommand
                .execute(&mut ctx, &["Chicago"])
                .await
                .unwrap()
        };
        let second = {
            let mut ctx = CommandContext::new(&mut store, &mut session);
            WeatherCommand
                .execute(&mut ctx, &["Chicago"])
                .await
                .unwrap()
        };

        // Identical record both times: generated once, then served from
        // the cache.
        assert_eq!(first, second);

        let stored = store.get(&weather_key("Chicago")).await.unwrap().unwrap();
        let record: WeatherRecord = serde_json::from_slice(&stored).unwrap();
        assert_eq!(vec![record.render("Chicago")], first);
    }

    #[tokio::test]
    async fn test_cities_are_cached_independently() {
        let mut store = MemoryStore::new();
        let mut session = Session::new();
        let mut ctx = CommandContext::new(&mut store, &mut session);

        WeatherCommand.execute(&mut ctx, &["Oslo"]).await.unwrap();
        WeatherCommand.execute(&mut ctx, &["Lima"]).await.unwrap();

        assert!(ctx.store.get(&weather_key("Oslo")).await.unwrap().is_some());
        assert!(ctx.store.get(&weather_key("Lima")).await.unwrap().is_some());
    }
}
