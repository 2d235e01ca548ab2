//! Type prediction.
//!
//! Every node execution records the type it produced, keyed by the
//! operation, its source location and the shapes of its inputs. Typed
//! assignments consult the history of their right-hand node and warn early
//! when the declared type looks unlikely.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use dollar_ir::{SourceSegment, Type};
use dollar_value::{NodeId, Value};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PredictionKey {
    operation: Arc<str>,
    source: SourceSegment,
    inputs: SmallVec<[&'static str; 4]>,
}

impl PredictionKey {
    pub fn new(operation: Arc<str>, source: SourceSegment, inputs: &[Value]) -> Self {
        PredictionKey {
            operation,
            source,
            inputs: inputs.iter().map(Value::type_name).collect(),
        }
    }
}

/// Observed result types for one key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypePrediction {
    counts: FxHashMap<Type, u64>,
    total: u64,
}

impl TypePrediction {
    fn observe(&mut self, ty: Type) {
        *self.counts.entry(ty).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Share of observations that `ty` accepts.
    #[expect(
        clippy::cast_precision_loss,
        reason = "observation counts stay far below 2^52"
    )]
    pub fn probability(&self, ty: Type) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let hits: u64 = self
            .counts
            .iter()
            .filter(|(observed, _)| ty.accepts(**observed))
            .map(|(_, n)| n)
            .sum();
        hits as f64 / self.total as f64
    }

    /// The most frequently observed type; ties go to the lower type.
    pub fn most_likely(&self) -> Option<Type> {
        self.counts
            .iter()
            .max_by(|(ta, na), (tb, nb)| na.cmp(nb).then(tb.cmp(ta)))
            .map(|(ty, _)| *ty)
    }
}

/// An assignment whose declared type its value rarely has.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeWarning {
    pub expected: Type,
    pub probability: f64,
    pub likely: Option<Type>,
}

impl fmt::Display for TypeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} with probability {:.2}",
            self.expected, self.probability
        )?;
        if let Some(likely) = self.likely {
            write!(f, ", most likely {likely}")?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct TypeLearner {
    table: DashMap<PredictionKey, TypePrediction>,
    by_node: DashMap<NodeId, PredictionKey>,
}

impl TypeLearner {
    pub fn new() -> Self {
        TypeLearner::default()
    }

    pub fn record(&self, node: NodeId, key: PredictionKey, ty: Type) {
        self.table.entry(key.clone()).or_default().observe(ty);
        self.by_node.insert(node, key);
    }

    pub fn predict(&self, key: &PredictionKey) -> Option<TypePrediction> {
        self.table.get(key).map(|p| p.clone())
    }

    /// History for the key `node` last executed under.
    pub fn predict_node(&self, node: NodeId) -> Option<TypePrediction> {
        let key = self.by_node.get(&node).map(|k| k.clone())?;
        self.predict(&key)
    }

    /// Warn when `node` has produced `expected` with less than `threshold`
    /// probability. Nodes with no history never warn.
    pub fn check(&self, node: NodeId, expected: Type, threshold: f64) -> Option<TypeWarning> {
        let prediction = self.predict_node(node)?;
        let probability = prediction.probability(expected);
        (probability < threshold).then(|| TypeWarning {
            expected,
            probability,
            likely: prediction.most_likely(),
        })
    }
}

impl fmt::Debug for TypeLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeLearner")
            .field("keys", &self.table.len())
            .finish_non_exhaustive()
    }
}
