use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::aggregator::RecommendationAggregator;
use super::error::{RecommenderError, RecommenderResult};
use super::matrix::{InteractionMatrix, InteractionMatrixBuilder};
use super::neighbors::{NeighborIndex, NeighborModel};
use super::scaler::{FeatureScaler, FitStatistics, ScaledMatrix};
use crate::models::{EngineState, EngineStatus, OrderRecord, ScoredItem, UserId};

/// Matrices and statistics produced by one `load`
#[derive(Debug)]
pub struct LoadedData {
    pub matrix: InteractionMatrix,
    pub scaled: Arc<ScaledMatrix>,
    pub statistics: FitStatistics,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedData {
    fn build(orders: &[OrderRecord]) -> RecommenderResult<Self> {
        let matrix = InteractionMatrixBuilder::build(orders)?;
        let (scaled, statistics) = FeatureScaler::fit(&matrix);

        Ok(Self {
            matrix,
            scaled: Arc::new(scaled),
            statistics,
            loaded_at: Utc::now(),
        })
    }
}

/// Everything one load + train cycle produced
///
/// Never mutated after construction; queries bind to one snapshot for their
/// whole duration.
#[derive(Debug)]
pub struct Snapshot {
    pub data: Arc<LoadedData>,
    pub model: NeighborModel,
    pub trained_at: DateTime<Utc>,
}

impl Snapshot {
    fn train(data: Arc<LoadedData>, k: usize) -> RecommenderResult<Self> {
        let users: Arc<[UserId]> = data.matrix.users().into();
        let model = NeighborIndex::build(Arc::clone(&data.scaled), users, k)?;

        Ok(Self {
            data,
            model,
            trained_at: Utc::now(),
        })
    }

    /// Ranks the items `user_id` has never bought by what their neighbors bought
    pub fn recommend(&self, user_id: UserId, top_n: usize) -> RecommenderResult<Vec<ScoredItem>> {
        let row = self.model.user_row(user_id)?;

        let neighbors: Vec<_> = self
            .model
            .query(user_id)?
            .into_iter()
            .filter(|neighbor| neighbor.row != row)
            .take(self.model.k())
            .collect();

        let owned = self.data.matrix.owned_items(row);

        Ok(RecommendationAggregator::aggregate(
            row,
            &neighbors,
            &self.data.matrix,
            &owned,
            top_n,
        ))
    }
}

#[derive(Debug, Clone)]
enum Published {
    Empty,
    Loaded(Arc<LoadedData>),
    Trained(Arc<Snapshot>),
}

/// Recommendation engine: `Empty → Loaded → Trained`
///
/// `load` and `train` build new state off to the side and publish it with a
/// single swap, so in-flight `recommend` calls keep the snapshot they started
/// with. Writers are serialized; readers never wait on a build.
#[derive(Debug)]
pub struct RecommenderService {
    published: RwLock<Published>,
    update_lock: Mutex<()>,
}

impl Default for RecommenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommenderService {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Published::Empty),
            update_lock: Mutex::new(()),
        }
    }

    /// Rebuilds the interaction and scaled matrices from scratch.
    ///
    /// Any trained model is discarded; `train` must run again before
    /// `recommend`. On error the previous state is kept.
    pub fn load(&self, orders: &[OrderRecord]) -> RecommenderResult<()> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let data = Arc::new(Self::build_data(orders)?);
        self.publish(Published::Loaded(data));

        Ok(())
    }

    /// Builds the neighbor model over the currently loaded data.
    pub fn train(&self, k: usize) -> RecommenderResult<()> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let data = match self.current() {
            Published::Empty => return Err(RecommenderError::NotLoaded),
            Published::Loaded(data) => data,
            Published::Trained(snapshot) => Arc::clone(&snapshot.data),
        };

        let snapshot = Self::train_snapshot(data, k)?;
        self.publish(Published::Trained(Arc::new(snapshot)));

        Ok(())
    }

    /// `load` followed by `train`, publishing only the trained result.
    ///
    /// Queries keep being served from the previous snapshot until the new one
    /// is ready, and keep it if either step fails.
    pub fn refresh(&self, orders: &[OrderRecord], k: usize) -> RecommenderResult<()> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let data = Arc::new(Self::build_data(orders)?);
        let snapshot = Self::train_snapshot(data, k)?;
        self.publish(Published::Trained(Arc::new(snapshot)));

        Ok(())
    }

    /// Top `top_n` novel items for `user_id`, best first
    pub fn recommend(&self, user_id: UserId, top_n: usize) -> RecommenderResult<Vec<ScoredItem>> {
        let snapshot = self.snapshot()?;
        let recommendations = snapshot.recommend(user_id, top_n)?;

        tracing::debug!(
            user_id,
            requested = top_n,
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(recommendations)
    }

    /// The published trained snapshot
    pub fn snapshot(&self) -> RecommenderResult<Arc<Snapshot>> {
        match self.current() {
            Published::Trained(snapshot) => Ok(snapshot),
            Published::Loaded(_) => Err(RecommenderError::NotTrained),
            Published::Empty => Err(RecommenderError::NotLoaded),
        }
    }

    pub fn status(&self) -> EngineStatus {
        let (state, data, snapshot) = match self.current() {
            Published::Empty => return EngineStatus::empty(),
            Published::Loaded(data) => (EngineState::Loaded, data, None),
            Published::Trained(snapshot) => {
                (EngineState::Trained, Arc::clone(&snapshot.data), Some(snapshot))
            }
        };

        EngineStatus {
            state,
            users: data.matrix.n_users(),
            items: data.matrix.n_items(),
            degenerate_items: data.statistics.degenerate_columns(),
            neighbors: snapshot.as_ref().map(|s| s.model.k()),
            loaded_at: Some(data.loaded_at),
            trained_at: snapshot.as_ref().map(|s| s.trained_at),
        }
    }

    fn build_data(orders: &[OrderRecord]) -> RecommenderResult<LoadedData> {
        let start = Instant::now();
        let data = LoadedData::build(orders)?;

        tracing::info!(
            orders = orders.len(),
            users = data.matrix.n_users(),
            items = data.matrix.n_items(),
            degenerate_items = data.statistics.degenerate_columns(),
            elapsed_ms = start.elapsed().as_millis(),
            "Interaction data loaded"
        );

        Ok(data)
    }

    fn train_snapshot(data: Arc<LoadedData>, k: usize) -> RecommenderResult<Snapshot> {
        let start = Instant::now();
        let snapshot = Snapshot::train(data, k)?;

        tracing::info!(
            neighbors = k,
            rows = snapshot.model.n_rows(),
            elapsed_ms = start.elapsed().as_millis(),
            "Neighbor model trained"
        );

        Ok(snapshot)
    }

    fn current(&self) -> Published {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, next: Published) {
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}
