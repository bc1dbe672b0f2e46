//! Input Vector Generation

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while materializing an input vector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// Tag was not `OrdC`, `OrdD` or `OrdA`
    #[error("Unknown vector type: {0:?} (expected OrdC, OrdD or OrdA)")]
    UnknownVectorType(String),

    /// Requested size overflows the value range
    #[error("Vector size {0} is too large to sample from 0..size*10")]
    SizeTooLarge(usize),
}

/// Ordering of a generated vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorKind {
    /// `OrdC`: `0, 1, ..., size - 1`
    Ascending,
    /// `OrdD`: `size, size - 1, ..., 1`
    Descending,
    /// `OrdA`: distinct values from `0..size * 10` in random order
    Random,
}

impl VectorKind {
    /// Tag used in instruction files
    pub fn tag(self) -> &'static str {
        match self {
            VectorKind::Ascending => "OrdC",
            VectorKind::Descending => "OrdD",
            VectorKind::Random => "OrdA",
        }
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VectorKind {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OrdC" => Ok(VectorKind::Ascending),
            "OrdD" => Ok(VectorKind::Descending),
            "OrdA" => Ok(VectorKind::Random),
            other => Err(GeneratorError::UnknownVectorType(other.to_string())),
        }
    }
}

/// Build an input vector of `size` elements.
///
/// Random vectors sample without replacement, so they never contain
/// duplicates.
pub fn generate_vector<R: Rng + ?Sized>(
    size: usize,
    kind: VectorKind,
    rng: &mut R,
) -> Result<Vec<i64>, GeneratorError> {
    let upper = i64::try_from(size).map_err(|_| GeneratorError::SizeTooLarge(size))?;

    let data = match kind {
        VectorKind::Ascending => (0..upper).collect(),
        VectorKind::Descending => (1..=upper).rev().collect(),
        VectorKind::Random => {
            let population = size
                .checked_mul(10)
                .ok_or(GeneratorError::SizeTooLarge(size))?;
            index::sample(rng, population, size)
                .into_iter()
                .map(|i| i as i64)
                .collect()
        }
    };

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_parse_tags() {
        assert_eq!("OrdC".parse(), Ok(VectorKind::Ascending));
        assert_eq!("OrdD".parse(), Ok(VectorKind::Descending));
        assert_eq!("OrdA".parse(), Ok(VectorKind::Random));
        assert_eq!(
            "OrdX".parse::<VectorKind>(),
            Err(GeneratorError::UnknownVectorType("OrdX".to_string()))
        );
    }

    #[test]
    fn test_ascending() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = generate_vector(5, VectorKind::Ascending, &mut rng).unwrap();
        assert_eq!(data, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_descending() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = generate_vector(5, VectorKind::Descending, &mut rng).unwrap();
        assert_eq!(data, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_random_is_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = generate_vector(1000, VectorKind::Random, &mut rng).unwrap();
        assert_eq!(data.len(), 1000);
        assert!(data.iter().all(|&x| (0..10_000).contains(&x)));
        let unique: HashSet<_> = data.iter().collect();
        assert_eq!(unique.len(), 1000);
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let a = generate_vector(64, VectorKind::Random, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_vector(64, VectorKind::Random, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_vectors() {
        let mut rng = StdRng::seed_from_u64(0);
        for kind in [VectorKind::Ascending, VectorKind::Descending, VectorKind::Random] {
            assert!(generate_vector(0, kind, &mut rng).unwrap().is_empty());
        }
    }

    #[test]
    fn test_oversized_random_vector_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_vector(usize::MAX / 2, VectorKind::Random, &mut rng),
            Err(GeneratorError::SizeTooLarge(usize::MAX / 2))
        );
    }
}
