//! Document id generation.
use uuid::Uuid;

/// Produces new document ids.
///
/// Ids must be unique, and should sort by creation time so that the id index is appended to rather than scattered.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates UUIDv7s, which start with a millisecond timestamp and are random after that.
#[derive(Copy, Clone, Debug, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

impl<F: Fn() -> String + Send + Sync> IdGenerator for F {
    fn generate(&self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn unique_and_sortable() {
        let ids = (0..1000)
            .map(|_| UuidV7Generator.generate())
            .collect::<Vec<_>>();

        let distinct = ids.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), ids.len());

        // Only the timestamp prefix is guaranteed to be ordered within a millisecond.
        for w in ids.windows(2) {
            assert!(w[0][..13] <= w[1][..13], "{} then {}", w[0], w[1]);
        }
    }

    #[test]
    fn closures_generate() {
        let g = || "fixed".to_string();
        assert_eq!(g.generate(), "fixed");
    }
}
