//! Fingerprinted response cache.
//!
//! Content-addressed store mapping a request fingerprint to a previously
//! computed canonical response. Entries expire lazily after a TTL and the
//! table is capacity-bounded: inserting past the limit evicts exactly one
//! entry, preferring the oldest TTL-expired entry, else the oldest by
//! insertion order. Identical fingerprints overwrite.
//!
//! Cache misses are cheap and cache failures are non-fatal: a disabled or
//! unavailable cache degrades every request to a miss, never to an error.
//! The dispatcher owns one instance; no global state.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

use crate::config::GatewayConfig;
use crate::types::{GenerateRequest, GenerateResponse};

/// A 256-bit request fingerprint.
///
/// Pure function of the determinism-relevant request fields: model short
/// name, ordered (role, content) pairs, exact temperature bits, and
/// max_tokens. Stable across processes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hex rendering of the digest.
    pub fn to_hex(self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({}..)", &self.to_hex()[..12])
    }
}

/// Compute the fingerprint of a request.
///
/// Every field is length- or tag-prefixed so that no two distinct field
/// sequences can produce the same byte stream.
pub fn fingerprint(request: &GenerateRequest) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(request.model.len() as u64).to_le_bytes());
    hasher.update(request.model.as_bytes());
    hasher.update(&request.temperature.to_bits().to_le_bytes());
    hasher.update(&request.max_tokens.to_le_bytes());

    for message in &request.messages {
        hasher.update(&[message.role as u8]);
        hasher.update(&(message.content.len() as u64).to_le_bytes());
        hasher.update(message.content.as_bytes());
    }

    Fingerprint(*hasher.finalize().as_bytes())
}

/// Cache occupancy, reported by `get_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub current_size: usize,
    pub max_size: usize,
    pub enabled: bool,
}

struct CacheEntry {
    response: GenerateResponse,
    inserted_at: Instant,
}

struct CacheInner {
    entries: HashMap<Fingerprint, CacheEntry>,
    /// Insertion order, oldest at the front. Kept in lockstep with
    /// `entries`: every removal drops the queue slot as well.
    order: VecDeque<Fingerprint>,
}

/// Bounded TTL cache of canonical responses, keyed by fingerprint.
pub struct FingerprintCache {
    enabled: bool,
    ttl: Duration,
    max_size: usize,
    inner: Mutex<CacheInner>,
}

impl FingerprintCache {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            // A zero-capacity cache can hold nothing; run it disabled so
            // the size bound holds even for that config.
            enabled: config.cache_enabled && config.cache_max_size > 0,
            ttl: Duration::from_secs(config.cache_ttl_secs),
            max_size: config.cache_max_size,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Look up a response. Expired entries are removed and reported
    /// absent. Disabled caches always miss.
    pub fn get(&self, fp: &Fingerprint) -> Option<GenerateResponse> {
        if !self.enabled {
            return None;
        }
        let mut inner = self.lock()?;

        let expired = match inner.entries.get(fp) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                return Some(entry.response.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            // Lazy expiry: physically present, logically absent. Drop the
            // queue slot too, or it would linger until capacity eviction.
            inner.entries.remove(fp);
            inner.order.retain(|f| f != fp);
        }
        None
    }

    /// Store a response, overwriting any entry with the same fingerprint.
    /// At capacity, evicts exactly one entry first.
    pub fn put(&self, fp: Fingerprint, response: GenerateResponse) {
        if !self.enabled {
            return;
        }
        let Some(mut inner) = self.lock() else {
            return;
        };

        if inner.entries.contains_key(&fp) {
            // Overwrite in place, refreshing age and insertion position.
            inner.entries.insert(
                fp,
                CacheEntry {
                    response,
                    inserted_at: Instant::now(),
                },
            );
            inner.order.retain(|f| f != &fp);
            inner.order.push_back(fp);
            return;
        }

        if inner.entries.len() >= self.max_size {
            self.evict_one(&mut inner);
        }

        inner.entries.insert(
            fp,
            CacheEntry {
                response,
                inserted_at: Instant::now(),
            },
        );
        inner.order.push_back(fp);
    }

    /// Number of physically present entries (expired-but-unswept included).
    pub fn size(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            current_size: self.size(),
            max_size: self.max_size,
            enabled: self.enabled,
        }
    }

    /// Remove one entry: the oldest TTL-expired one if any, otherwise the
    /// oldest-inserted.
    fn evict_one(&self, inner: &mut CacheInner) {
        // Prefer an expired entry, scanning oldest-first.
        let expired = inner.order.iter().position(|fp| {
            inner
                .entries
                .get(fp)
                .is_some_and(|e| e.inserted_at.elapsed() > self.ttl)
        });
        if let Some(pos) = expired {
            let fp = inner.order.remove(pos).expect("position within bounds");
            inner.entries.remove(&fp);
            return;
        }

        // Otherwise oldest insertion order.
        if let Some(fp) = inner.order.pop_front() {
            inner.entries.remove(&fp);
        }
    }

    /// Acquire the table lock, failing open on poisoning.
    fn lock(&self) -> Option<std::sync::MutexGuard<'_, CacheInner>> {
        match self.inner.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("fingerprint cache lock poisoned; treating cache as disabled");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn request(model: &str, content: &str) -> GenerateRequest {
        GenerateRequest::new(model, vec![Message::user(content)])
    }

    #[test]
    fn fingerprint_deterministic() {
        let r = request("nova-pro", "hello");
        assert_eq!(fingerprint(&r), fingerprint(&r.clone()));
    }

    #[test]
    fn fingerprint_differs_on_model() {
        assert_ne!(
            fingerprint(&request("nova-pro", "hello")),
            fingerprint(&request("nova-lite", "hello"))
        );
    }

    #[test]
    fn fingerprint_differs_on_content() {
        assert_ne!(
            fingerprint(&request("nova-pro", "hello")),
            fingerprint(&request("nova-pro", "world"))
        );
    }

    #[test]
    fn fingerprint_differs_on_temperature() {
        assert_ne!(
            fingerprint(&request("nova-pro", "hello")),
            fingerprint(&request("nova-pro", "hello").temperature(0.9))
        );
    }

    #[test]
    fn fingerprint_differs_on_max_tokens() {
        assert_ne!(
            fingerprint(&request("nova-pro", "hello")),
            fingerprint(&request("nova-pro", "hello").max_tokens(100))
        );
    }

    #[test]
    fn fingerprint_differs_on_role() {
        let user = GenerateRequest::new("m", vec![Message::user("x")]);
        let system = GenerateRequest::new("m", vec![Message::system("x")]);
        assert_ne!(fingerprint(&user), fingerprint(&system));
    }

    #[test]
    fn fingerprint_sensitive_to_message_order() {
        let ab = GenerateRequest::new("m", vec![Message::user("a"), Message::assistant("b")]);
        let ba = GenerateRequest::new("m", vec![Message::assistant("b"), Message::user("a")]);
        assert_ne!(fingerprint(&ab), fingerprint(&ba));
    }

    fn response(content: &str) -> GenerateResponse {
        GenerateResponse {
            content: content.to_string(),
            model: "nova-pro".to_string(),
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            usage: crate::types::Usage::new(10, 20),
            finish_reason: crate::types::FinishReason::Stop,
            cached: false,
            latency_ms: 12.0,
            estimated_cost_usd: 0.0001,
        }
    }

    #[test]
    fn expiry_on_get_releases_the_queue_slot() {
        let cache = FingerprintCache::new(&GatewayConfig {
            cache_ttl_secs: 0,
            ..GatewayConfig::default()
        });
        let fp = fingerprint(&request("nova-pro", "hello"));
        cache.put(fp, response("gone"));
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(cache.get(&fp).is_none());

        let inner = cache.inner.lock().unwrap();
        assert!(inner.entries.is_empty());
        assert!(
            inner.order.is_empty(),
            "expired fingerprint must leave the insertion queue with its entry"
        );
    }

    #[test]
    fn queue_does_not_grow_across_expire_and_reinsert_cycles() {
        let cache = FingerprintCache::new(&GatewayConfig {
            cache_ttl_secs: 0,
            ..GatewayConfig::default()
        });
        for i in 0..50 {
            let fp = fingerprint(&request("nova-pro", &format!("prompt {i}")));
            cache.put(fp, response("x"));
            std::thread::sleep(std::time::Duration::from_millis(1));
            assert!(cache.get(&fp).is_none());
        }

        let inner = cache.inner.lock().unwrap();
        assert!(inner.entries.is_empty());
        assert!(inner.order.is_empty());
    }

    #[test]
    fn fingerprint_no_field_boundary_collision() {
        // "ab" + "c" must not collide with "a" + "bc".
        let r1 = GenerateRequest::new("m", vec![Message::user("ab"), Message::user("c")]);
        let r2 = GenerateRequest::new("m", vec![Message::user("a"), Message::user("bc")]);
        assert_ne!(fingerprint(&r1), fingerprint(&r2));
    }
}
