use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use stockhub_config::Config;
use stockhub_counter_store::{CounterStore, MemoryCounterStore, RedisCounterStore};
use stockhub_inventory::{Catalog, InventoryError, Item};
use stockhub_job_queue::{JobQueueClient, QueueOptions};

/// Connect the configured counter store, or fall back to process memory.
pub async fn counter_store_from_config(cfg: &Config) -> anyhow::Result<Arc<dyn CounterStore>> {
    match cfg.redis_url.as_deref() {
        Some(url) => {
            let store = RedisCounterStore::connect(url).await?;
            tracing::info!(redis_url = %url, "using redis counter store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no redis url configured, counters live in process memory only");
            Ok(Arc::new(MemoryCounterStore::new()))
        }
    }
}

/// The configured catalog, or the built-in one when none is configured.
pub fn catalog_from_config(cfg: &Config) -> Result<Catalog, InventoryError> {
    if cfg.products.is_empty() {
        return Ok(Catalog::default());
    }
    let items = cfg
        .products
        .iter()
        .map(|p| {
            Item::new(
                p.item_id,
                p.item_name.clone(),
                p.price,
                p.initial_available_quantity,
            )
        })
        .collect();
    Catalog::new(items)
}

pub fn job_queue_from_config(cfg: &Config) -> JobQueueClient {
    JobQueueClient::with_options(QueueOptions {
        event_capacity: cfg.queue.event_capacity,
        max_job_runs: cfg.queue.max_job_runs,
    })
}

/// Parse host and port into a SocketAddr, falling back to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) if host.eq_ignore_ascii_case("localhost") => SocketAddr::from(([127, 0, 0, 1], port)),
        Err(_) => {
            tracing::warn!(%host, "host is not an IP address, binding to 0.0.0.0");
            SocketAddr::from(([0, 0, 0, 0], port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockhub_config::ProductSection;

    #[test]
    fn empty_product_list_uses_builtin_catalog() {
        let catalog = catalog_from_config(&Config::default()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(4).unwrap().item_name, "Suitcase 1050");
    }

    #[test]
    fn configured_products_replace_catalog() {
        let mut cfg = Config::default();
        cfg.products = vec![ProductSection {
            item_id: 9,
            item_name: "Trunk".into(),
            price: 12.5,
            initial_available_quantity: 3,
        }];
        let catalog = catalog_from_config(&cfg).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(9).unwrap().initial_available_quantity, 3);
    }

    #[test]
    fn bind_address_parsing() {
        assert_eq!(
            parse_bind_address("127.0.0.1", 1245),
            "127.0.0.1:1245".parse().unwrap()
        );
        assert_eq!(parse_bind_address("::1", 80), "[::1]:80".parse().unwrap());
        assert_eq!(
            parse_bind_address("localhost", 1245),
            "127.0.0.1:1245".parse().unwrap()
        );
        assert_eq!(
            parse_bind_address("example.internal", 1245),
            "0.0.0.0:1245".parse().unwrap()
        );
    }

    #[tokio::test]
    async fn missing_redis_url_uses_memory_store() {
        let store = counter_store_from_config(&Config::default()).await.unwrap();
        store.set("item.1", 2).await.unwrap();
        assert_eq!(store.get("item.1").await.unwrap(), Some(2));
    }
}
