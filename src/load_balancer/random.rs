//! Uniform random load balancing strategy.

use rand::Rng;

use crate::load_balancer::{BackendSelector, NoBackendsError};

/// Picks a backend uniformly at random, independently per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl RandomSelector {
    pub fn new() -> Self {
        Self
    }
}

impl BackendSelector for RandomSelector {
    fn select<'a>(&self, servers: &'a [String]) -> Result<&'a str, NoBackendsError> {
        match servers {
            [] => Err(NoBackendsError),
            [only] => Ok(only.as_str()),
            _ => {
                let index = rand::thread_rng().gen_range(0..servers.len());
                Ok(servers[index].as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_is_error() {
        let lb = RandomSelector::new();
        assert_eq!(lb.select(&[]), Err(NoBackendsError));
    }

    #[test]
    fn test_single_is_deterministic() {
        let lb = RandomSelector::new();
        let servers = vec!["http://127.0.0.1:9001".to_string()];
        for _ in 0..100 {
            assert_eq!(lb.select(&servers), Ok("http://127.0.0.1:9001"));
        }
    }

    #[test]
    fn test_every_backend_is_picked() {
        let lb = RandomSelector::new();
        let servers: Vec<String> = (0..3).map(|i| format!("http://host{}", i)).collect();

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for _ in 0..1000 {
            *hits.entry(lb.select(&servers).unwrap()).or_default() += 1;
        }

        assert_eq!(hits.len(), 3);
        for server in &servers {
            // Expected ~333 each.
            assert!(hits[server.as_str()] > 200, "{} got {}", server, hits[server.as_str()]);
        }
    }
}
