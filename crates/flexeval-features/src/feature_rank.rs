//! Ranked features.
//!
//! A [`FeatureRank`] is identified by its feature name alone: two ranks of
//! the same feature are equal (and hash equally) whatever their scores. The
//! score only takes part in ordering, through [`FeatureRank::cmp_by_rank`].
//! `FeatureRank` therefore does not implement `Ord`.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// A feature with its rank score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRank {
    feature: String,
    rank: f64,
}

impl FeatureRank {
    #[must_use]
    pub fn new(feature: impl Into<String>, rank: f64) -> Self {
        Self {
            feature: feature.into(),
            rank,
        }
    }

    #[must_use]
    pub fn feature(&self) -> &str {
        &self.feature
    }

    #[must_use]
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Orders by rank, ascending. Different features with the same rank
    /// compare as `Equal` even though they are not equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    ///
    /// use flexeval_features::feature_rank::FeatureRank;
    ///
    /// let a = FeatureRank::new("geneA", 0.3);
    /// let b = FeatureRank::new("geneB", 0.3);
    /// assert_eq!(a.cmp_by_rank(&b), Ordering::Equal);
    /// assert_ne!(a, b);
    /// assert_eq!(a, FeatureRank::new("geneA", 0.9));
    /// ```
    #[must_use]
    pub fn cmp_by_rank(&self, other: &Self) -> Ordering {
        self.rank.total_cmp(&other.rank)
    }
}

impl PartialEq for FeatureRank {
    fn eq(&self, other: &Self) -> bool {
        self.feature == other.feature
    }
}

impl Eq for FeatureRank {}

impl Hash for FeatureRank {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.feature.hash(state);
    }
}

impl fmt::Display for FeatureRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.feature, self.rank)
    }
}

/// Sorts ranks ascending by score. Equal scores keep their relative order.
pub fn sort_by_rank(ranks: &mut [FeatureRank]) {
    ranks.sort_by(FeatureRank::cmp_by_rank);
}

/// Drops repeated features, keeping the first occurrence of each.
#[must_use]
pub fn dedup_by_feature(ranks: Vec<FeatureRank>) -> Vec<FeatureRank> {
    let mut seen = HashSet::new();
    ranks
        .into_iter()
        .filter(|rank| seen.insert(rank.feature.clone()))
        .collect()
}

/// Mean rank of every feature across repeated rankings.
///
/// Each ranking added with [`add`](Self::add) gives its features the ranks
/// `1, 2, 3, ...` in list order. A feature's mean rank is the sum of its
/// ranks divided by the number of rankings added.
#[derive(Debug, Clone, Default)]
pub struct FeatureRanks {
    cumulative: HashMap<String, f64>,
    num_rankings: usize,
}

impl FeatureRanks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn add<I>(&mut self, ranked_features: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for (index, feature) in ranked_features.into_iter().enumerate() {
            *self.cumulative.entry(feature.into()).or_default() += (index + 1) as f64;
        }
        self.num_rankings += 1;
    }

    #[must_use]
    pub fn num_rankings(&self) -> usize {
        self.num_rankings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Features in order of mean rank, best (lowest) first. Equal mean ranks
    /// are ordered by feature name.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_ranks(&self) -> Vec<FeatureRank> {
        let num_rankings = self.num_rankings.max(1) as f64;
        let mut ranks = self
            .cumulative
            .iter()
            .map(|(feature, total)| FeatureRank::new(feature.clone(), total / num_rankings))
            .collect::<Vec<_>>();
        ranks.sort_by(|a, b| a.cmp_by_rank(b).then_with(|| a.feature.cmp(&b.feature)));
        ranks
    }

    /// The `n` best features by mean rank.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<FeatureRank> {
        let mut ranks = self.mean_ranks();
        ranks.truncate(n);
        ranks
    }

    /// [`rank_table`] of all [`mean_ranks`](Self::mean_ranks).
    #[must_use]
    pub fn to_table(&self) -> String {
        rank_table(&self.mean_ranks())
    }
}

/// Tab-separated `Feature` / `Mean Rank` table, one feature per line.
#[must_use]
pub fn rank_table(ranks: &[FeatureRank]) -> String {
    ranks
        .iter()
        .fold(String::from("Feature\tMean Rank\n"), |mut table, rank| {
            table.push_str(&format!("{}\t{}\n", rank.feature, rank.rank));
            table
        })
}
