//! Session wiring.
//!
//! Stores are synchronous; [`ViewerSession::sync`] polls distinct-until-changed
//! watches over them and performs the reactions, including the asynchronous
//! column fetches, in one place.

use std::sync::Arc;

use compute::{CelltypeEncoder, GeneEncoder, GeneRange};
use formats::{
    CLUSTER_COLUMN, CellTable, Column, DatasetProfile, ExpressionSource, PALETTE_COLUMN, Palette, SPATIAL_X_COLUMN,
    SPATIAL_Y_COLUMN, SPATIAL_Z_COLUMN, SourceError, reorder_by_indexes,
};
use runtime::{EventBus, Frame, Metrics, Watch, names};
use scene::{SceneConfig, SceneController, Viewport};
use state::{AppStores, ButtonState, GeneMode, QueryParams, SelectedState, Showing};
use tracing::{debug, error, info, warn};

use crate::{PanelModel, SessionError};

/// Event kinds recorded on the session's [`EventBus`].
pub mod kinds {
    pub const LOADED: &str = "loaded";
    pub const CELLTYPE_ENCODING: &str = "encode.celltype";
    pub const GENE_ENCODING: &str = "encode.gene";
    pub const QUERY_SYNC: &str = "query.sync";
    pub const DOT_SIZE: &str = "dot_size";
    pub const FETCH_FAILED: &str = "fetch.failed";
}

/// Encodings run by a single `sync`; a later request replaces an earlier one.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Encoding {
    Celltype,
    Gene { ceiling_override: Option<f64> },
}

struct SessionWatches {
    celltypes: Watch<SelectedState, Vec<String>>,
    genes: Watch<SelectedState, Vec<String>>,
    mode: Watch<SelectedState, GeneMode>,
    dot_size: Watch<ButtonState, f64>,
    percentile: Watch<ButtonState, f64>,
    gene_value: Watch<ButtonState, f64>,
}

impl SessionWatches {
    fn new(stores: &AppStores) -> Self {
        Self {
            celltypes: stores.selected.watch(|s| s.selected_celltypes.clone()),
            genes: stores.selected.watch(|s| s.selected_genes.clone()),
            mode: stores.selected.watch(|s| s.mode),
            dot_size: stores.button.watch(|b| b.dot_size),
            percentile: stores.button.watch(|b| b.gene_percentile),
            gene_value: stores.button.watch(|b| b.current_gene_value),
        }
    }
}

pub struct ViewerSession {
    stores: AppStores,
    source: Arc<dyn ExpressionSource>,
    viewport: Viewport,
    cells: Option<CellTable>,
    scene: Option<SceneController>,
    query: QueryParams,
    last_range: Option<GeneRange>,
    watches: SessionWatches,
    events: EventBus,
    metrics: Metrics,
}

impl ViewerSession {
    pub fn new(stores: AppStores, source: Arc<dyn ExpressionSource>, viewport: Viewport) -> Self {
        let watches = SessionWatches::new(&stores);
        let mut query = QueryParams::new();
        query.set(state::PREFIX_PARAM, stores.api.get().prefix.clone());
        Self {
            stores,
            source,
            viewport,
            cells: None,
            scene: None,
            query,
            last_range: None,
            watches,
            events: EventBus::new(),
            metrics: Metrics::new(),
        }
    }

    /// Seeds the query mirror, e.g. with the parameters the session was opened with.
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn stores(&self) -> &AppStores {
        &self.stores
    }

    /// Mutable store access for UI handlers; reactions run on the next `sync`.
    pub fn stores_mut(&mut self) -> &mut AppStores {
        &mut self.stores
    }

    pub fn scene(&self) -> Option<&SceneController> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut SceneController> {
        self.scene.as_mut()
    }

    pub fn cells(&self) -> Option<&CellTable> {
        self.cells.as_ref()
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn last_range(&self) -> Option<&GeneRange> {
        self.last_range.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn profile(&self) -> DatasetProfile {
        self.stores.api.get().profile()
    }

    fn frame(&self) -> Frame {
        self.scene.as_ref().map(|s| s.frame()).unwrap_or(Frame::new(0, 0.0))
    }

    /// Fetches positions, clusters and the palette, then builds the scene.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        self.stores.ui.update(|ui| ui.set_loading(true));
        let result = self.load_inner().await;
        self.stores.ui.update(|ui| ui.set_loading(false));
        if let Err(err) = &result {
            self.record_failure("load", err);
        }
        result
    }

    async fn load_inner(&mut self) -> Result<(), SessionError> {
        let prefix = self.stores.api.get().prefix.clone();
        let profile = self.profile();
        info!(%prefix, %profile, "loading dataset");

        let x = self.source.fetch_column(SPATIAL_X_COLUMN, &prefix).await?;
        let y = self.source.fetch_column(SPATIAL_Y_COLUMN, &prefix).await?;
        let z = match profile {
            DatasetProfile::Moe => None,
            _ => self.optional_column(SPATIAL_Z_COLUMN, &prefix).await?,
        };
        let clusters = self.source.fetch_column(CLUSTER_COLUMN, &prefix).await?;
        let cells = CellTable::from_columns(&x, &y, z.as_ref(), &clusters)?;

        if self.stores.api.get().palette.is_empty() {
            let names = self.source.fetch_values(CLUSTER_COLUMN, &prefix).await?;
            let colors = self.source.fetch_values(PALETTE_COLUMN, &prefix).await?;
            let palette = Palette::from_lists(&names, &colors);
            self.stores.api.update(|api| api.palette = palette);
        }
        let palette = self.stores.api.get().palette.clone();

        let button = self.stores.button.get();
        let config = SceneConfig {
            profile,
            camera_position: button.camera_position,
            target: button.target,
            dot_size: button.dot_size,
            viewport: self.viewport,
        };
        let scene = SceneController::new(config, &cells, palette);
        self.metrics
            .set_gauge(names::LOADED_POINTS, i64::try_from(cells.len()).unwrap_or(i64::MAX));
        self.events
            .emit(scene.frame(), kinds::LOADED, format!("{prefix}: {} cells", cells.len()));
        self.scene = Some(scene);
        self.cells = Some(cells);
        Ok(())
    }

    /// A missing column is `None`; other failures propagate.
    async fn optional_column(&self, column: &str, prefix: &str) -> Result<Option<Column>, SourceError> {
        match self.source.fetch_column(column, prefix).await {
            Ok(col) => Ok(Some(col)),
            Err(SourceError::NotFound { .. }) | Err(SourceError::Http { status: 404, .. }) => {
                debug!(column, "optional column absent");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Polls every watch once and performs the resulting reactions.
    ///
    /// A failed encoding leaves the point buffers as they were.
    pub async fn sync(&mut self) -> Result<(), SessionError> {
        if self.scene.is_none() {
            return Err(SessionError::NotLoaded);
        }
        let mut encoding = None;
        let mut query_dirty = false;

        if let Some(celltypes) = self.watches.celltypes.poll(&self.stores.selected) {
            debug!(?celltypes, "selected celltypes changed");
            encoding = Some(Encoding::Celltype);
            query_dirty = true;
        }
        if let Some(genes) = self.watches.genes.poll(&self.stores.selected) {
            debug!(?genes, "selected genes changed");
            encoding = Some(if genes.is_empty() {
                Encoding::Celltype
            } else {
                Encoding::Gene { ceiling_override: None }
            });
            query_dirty = true;
        }
        if self.watches.mode.poll(&self.stores.selected).is_some() {
            query_dirty = true;
        }
        if let Some(dot_size) = self.watches.dot_size.poll(&self.stores.button) {
            let frame = self.frame();
            if let Some(scene) = self.scene.as_mut() {
                scene.set_dot_size(dot_size);
            }
            self.events.emit(frame, kinds::DOT_SIZE, dot_size.to_string());
        }
        let has_genes = !self.stores.selected.get().selected_genes.is_empty();
        // The first poll only primes these two; the initial encoding is
        // already requested by the selection watches.
        let primed = self.watches.percentile.last().is_some();
        if self.watches.percentile.poll(&self.stores.button).is_some() && primed {
            encoding = Some(if has_genes {
                Encoding::Gene { ceiling_override: None }
            } else {
                Encoding::Celltype
            });
        }
        let primed = self.watches.gene_value.last().is_some();
        if self.watches.gene_value.poll(&self.stores.button).is_some() && primed && has_genes {
            if let Some(value) = self.stores.button.get().gene_value_override() {
                encoding = Some(Encoding::Gene {
                    ceiling_override: Some(value),
                });
            }
        }

        if query_dirty {
            self.sync_query();
        }
        match encoding {
            Some(Encoding::Celltype) => {
                self.encode_celltypes()?;
                Ok(())
            }
            Some(Encoding::Gene { ceiling_override }) => self.encode_genes(ceiling_override).await,
            None => Ok(()),
        }
    }

    fn sync_query(&mut self) {
        self.stores.selected.get().write_query(&mut self.query);
        let frame = self.frame();
        self.events.emit(frame, kinds::QUERY_SYNC, self.query.to_query_string());
    }

    fn encode_celltypes(&mut self) -> Result<(), SessionError> {
        let (Some(cells), Some(scene)) = (self.cells.as_ref(), self.scene.as_mut()) else {
            return Err(SessionError::NotLoaded);
        };
        let api = self.stores.api.get();
        let selected = &self.stores.selected.get().selected_celltypes;
        let attributes = CelltypeEncoder::new(api.profile()).encode(&cells.clusters, &api.palette, selected);

        self.stores.ui.update(|ui| ui.set_loading(true));
        let applied = scene.apply(&attributes);
        self.stores.ui.update(|ui| ui.set_loading(false));
        applied?;

        self.metrics.inc(names::CELLTYPE_ENCODINGS);
        self.last_range = None;
        let message = format!("{} selected, {} visible", selected.len(), attributes.visible_count());
        self.events.emit(scene.frame(), kinds::CELLTYPE_ENCODING, message);
        self.stores.selected.update(|s| s.update_showing(Showing::Celltype));
        Ok(())
    }

    async fn encode_genes(&mut self, ceiling_override: Option<f64>) -> Result<(), SessionError> {
        self.stores.ui.update(|ui| ui.set_loading(true));
        let result = self.encode_genes_inner(ceiling_override).await;
        self.stores.ui.update(|ui| ui.set_loading(false));
        if let Err(err) = &result {
            self.record_failure("gene encoding", err);
        }
        result
    }

    async fn encode_genes_inner(&mut self, ceiling_override: Option<f64>) -> Result<(), SessionError> {
        let genes = self.stores.selected.get().selected_genes.clone();
        if genes.len() > 2 {
            warn!(count = genes.len(), "more than two genes selected; extra genes are not shown");
        }
        let mut values = Vec::with_capacity(2);
        for gene in genes.iter().take(2) {
            values.push(self.fetch_gene(gene).await?);
        }

        let (Some(cells), Some(scene)) = (self.cells.as_ref(), self.scene.as_mut()) else {
            return Err(SessionError::NotLoaded);
        };
        let profile = self.stores.api.get().profile();
        let percentile = self.stores.button.get().gene_percentile;
        let refs: Vec<&[f64]> = values.iter().map(Vec::as_slice).collect();
        let encoding = GeneEncoder::new(profile)
            .with_percentile(percentile)
            .with_ceiling_override(ceiling_override)
            .encode(&refs, &cells.clusters)?;
        scene.apply(&encoding.attributes)?;

        let range = encoding.range;
        self.metrics.inc(names::GENE_ENCODINGS);
        self.events.emit(
            scene.frame(),
            kinds::GENE_ENCODING,
            format!(
                "{} nmax={:.3} visible={}",
                genes.join("+"),
                range.current,
                encoding.attributes.visible_count()
            ),
        );
        self.stores
            .button
            .update(|b| b.update_gene_expression_range(range.min_value, range.current, range.max));
        // The range write moves the slider; that is not a user override.
        let _ = self.watches.gene_value.poll(&self.stores.button);
        self.stores.selected.update(|s| s.update_showing(Showing::Gene));
        self.last_range = Some(range);
        Ok(())
    }

    /// One gene column as numbers, reordered for datasets that need it.
    async fn fetch_gene(&self, gene: &str) -> Result<Vec<f64>, SessionError> {
        let api = self.stores.api.get();
        let column = self.source.fetch_column(gene, &api.prefix).await?;
        let values = column.numeric();
        if api.profile().reorders_genes() && !api.reorder.is_empty() {
            return Ok(reorder_by_indexes(&values, &api.reorder)?);
        }
        Ok(values)
    }

    fn record_failure(&mut self, what: &str, err: &SessionError) {
        error!(%err, what, "session update failed");
        if matches!(err, SessionError::Source(_)) {
            self.metrics.inc(names::FETCH_FAILURES);
        }
        let frame = self.frame();
        self.events.emit(frame, kinds::FETCH_FAILED, format!("{what}: {err}"));
    }

    /// Panel state for the current stores and last encoding.
    pub fn panels(&self) -> PanelModel {
        PanelModel::build(
            self.stores.selected.get(),
            self.stores.button.get(),
            &self.stores.api.get().palette,
            self.last_range.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::Rgb8;
    use formats::StaticSource;
    use pretty_assertions::assert_eq;
    use state::{ApiState, CELLTYPE_PARAM, GENE_PARAM, MODE_PARAM};

    const PREFIX: &str = "or";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn source(prefix: &str) -> StaticSource {
        StaticSource::new()
            .with_column_text(prefix, "X_spatial0_norm,0.1,0.2,0.3,0.4")
            .with_column_text(prefix, "X_spatial1_norm,0.5,0.6,0.7,0.8")
            .with_column_text(prefix, "clusters,Mitral,Granule,,Mitral")
            .with_column_text(prefix, "Gad1,0,2,4,8")
            .with_column_text(prefix, "Pvalb,1,1,1,1")
            .with_values(prefix, "clusters", strings(&["Mitral", "Granule"]))
            .with_values(prefix, "clusters_pal", strings(&["#ff0000", "#00ff00"]))
    }

    async fn loaded(prefix: &str, source: Arc<StaticSource>) -> ViewerSession {
        let stores = AppStores::new(ApiState::new(prefix), SelectedState::default());
        let mut session = ViewerSession::new(stores, source, Viewport::new(800.0, 600.0));
        session.load().await.unwrap();
        session
    }

    fn main_colors(session: &ViewerSession) -> Vec<Rgb8> {
        let layer = session.scene().unwrap().cloud().main();
        layer.colors.iter().map(|c| Rgb8::from_unit(*c)).collect()
    }

    #[tokio::test]
    async fn load_builds_scene_and_palette() {
        let session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        let scene = session.scene().unwrap();
        assert_eq!(scene.cloud().len(), 4);
        assert!(scene.cloud().background().is_none());
        assert_eq!(session.stores().api.get().palette.get("Granule"), Some(Rgb8::new(0, 255, 0)));
        assert!(!session.stores().ui.get().is_loading);
        assert_eq!(session.events().kinds(), vec![kinds::LOADED]);
        assert_eq!(session.metrics().gauge(names::LOADED_POINTS), Some(4));
    }

    #[tokio::test]
    async fn sync_before_load_is_rejected() {
        let stores = AppStores::new(ApiState::new(PREFIX), SelectedState::default());
        let mut session = ViewerSession::new(stores, Arc::new(source(PREFIX)), Viewport::default());
        assert!(matches!(session.sync().await, Err(SessionError::NotLoaded)));
    }

    #[tokio::test]
    async fn first_sync_encodes_celltypes_once() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session.sync().await.unwrap();
        assert_eq!(session.events().count(kinds::CELLTYPE_ENCODING), 1);
        let encoded = session
            .events()
            .events()
            .iter()
            .find(|e| e.kind == kinds::CELLTYPE_ENCODING)
            .unwrap();
        assert_eq!(encoded.message, "0 selected, 3 visible");
        assert_eq!(
            main_colors(&session),
            vec![
                Rgb8::new(255, 0, 0),
                Rgb8::new(0, 255, 0),
                Rgb8::BLACK,
                Rgb8::new(255, 0, 0)
            ]
        );
        // Nothing changed: no further reactions.
        session.sync().await.unwrap();
        assert_eq!(session.events().count(kinds::CELLTYPE_ENCODING), 1);
    }

    #[tokio::test]
    async fn celltype_selection_dims_others_and_updates_query() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session.sync().await.unwrap();
        session
            .stores_mut()
            .selected
            .update(|s| s.toggle_celltype("Granule"));
        session.sync().await.unwrap();

        let layer = session.scene().unwrap().cloud().main();
        assert_eq!(layer.sizes, vec![0.5, 2.0, -1.0, 0.5]);
        assert_eq!(layer.alphas, vec![0.5, 1.0, -1.0, 0.5]);
        assert_eq!(
            session.query().list(CELLTYPE_PARAM).unwrap(),
            Some(strings(&["Granule"]))
        );
        assert_eq!(session.panels().celltype_badges[0].color, Some(Rgb8::new(0, 255, 0)));
    }

    #[tokio::test]
    async fn gene_selection_encodes_and_writes_range_back() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session.sync().await.unwrap();
        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1"])));
        session.sync().await.unwrap();

        // Sorted [0,2,4,8]: p99 -> index 3 -> 8; p80 -> index 3 -> 8.
        let range = *session.last_range().unwrap();
        assert_eq!(range.current, 8.0);
        assert_eq!(range.max, 8.0);
        let button = session.stores().button.get();
        assert_eq!(button.current_gene_value, 8.0);
        assert_eq!(button.max_gene_value, 8.0);
        assert_eq!(session.stores().selected.get().showing, Showing::Gene);
        assert_eq!(session.query().list(GENE_PARAM).unwrap(), Some(strings(&["Gad1"])));
        assert_eq!(session.query().get(MODE_PARAM), Some("1"));

        // 0 -> blue, 8 -> red (the empty-cluster cell is shown too).
        let colors = main_colors(&session);
        assert_eq!(colors[0], Rgb8::new(0, 0, 255));
        assert_eq!(colors[3], Rgb8::new(255, 0, 0));
        assert!(session.panels().percentile_enabled);

        // The range write-back must not trigger another encoding.
        session.sync().await.unwrap();
        assert_eq!(session.events().count(kinds::GENE_ENCODING), 1);
    }

    #[tokio::test]
    async fn slider_override_reencodes_with_new_ceiling() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1"])));
        session.sync().await.unwrap();

        session
            .stores_mut()
            .button
            .update(|b| b.update_current_gene_value(4.0));
        session.sync().await.unwrap();
        assert_eq!(session.events().count(kinds::GENE_ENCODING), 2);
        assert_eq!(session.last_range().unwrap().current, 4.0);
        // 4/4 and 8/4 both saturate to red.
        let colors = main_colors(&session);
        assert_eq!(colors[2], Rgb8::new(255, 0, 0));
        assert_eq!(colors[3], Rgb8::new(255, 0, 0));
    }

    #[tokio::test]
    async fn percentile_change_reencodes_shown_gene() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1"])));
        session.sync().await.unwrap();
        assert_eq!(session.last_range().unwrap().current, 8.0);

        session
            .stores_mut()
            .button
            .update(|b| b.update_gene_percentile(50.0));
        session.sync().await.unwrap();

        // Sorted [0,2,4,8]: p50 -> index 2 -> 4; the slider floor stays at p80.
        let range = *session.last_range().unwrap();
        assert_eq!(range.current, 4.0);
        assert_eq!(range.min_value, 8.0);
        assert_eq!(session.events().count(kinds::GENE_ENCODING), 2);
        assert_eq!(session.stores().button.get().current_gene_value, 4.0);
        assert_eq!(main_colors(&session)[2], Rgb8::new(255, 0, 0));

        session.sync().await.unwrap();
        assert_eq!(session.events().count(kinds::GENE_ENCODING), 2);
    }

    #[tokio::test]
    async fn clearing_genes_returns_to_celltypes() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1", "Pvalb"])));
        session.sync().await.unwrap();
        assert!(matches!(session.panels().colorbars, crate::Colorbars::Dual { .. }));

        session.stores_mut().selected.update(|s| {
            s.remove_gene("Gad1");
            s.remove_gene("Pvalb");
        });
        session.sync().await.unwrap();
        assert_eq!(session.last_range(), None);
        assert_eq!(session.panels().colorbars, crate::Colorbars::Hidden);
        assert_eq!(session.query().get(GENE_PARAM), None);
        assert_eq!(session.events().count(kinds::CELLTYPE_ENCODING), 1);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_buffers_unchanged() {
        let source = Arc::new(source(PREFIX).with_failure("Gad1", 500));
        let mut session = loaded(PREFIX, source.clone()).await;
        session.sync().await.unwrap();
        let before = session.scene().unwrap().cloud().main().clone();

        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1"])));
        let err = session.sync().await.unwrap_err();
        assert!(matches!(err, SessionError::Source(SourceError::Http { status: 500, .. })));
        assert_eq!(session.scene().unwrap().cloud().main(), &before);
        assert_eq!(session.metrics().counter(names::FETCH_FAILURES), 1);
        assert_eq!(session.events().count(kinds::FETCH_FAILED), 1);
        assert!(!session.stores().ui.get().is_loading);
        assert!(source.request_count() > 0);
    }

    #[tokio::test]
    async fn moe_reorders_genes_and_uses_background_layer() {
        let prefix = "moe";
        let src = Arc::new(source(prefix));
        let mut api = ApiState::new(prefix);
        api.reorder = vec![3, 2, 1, 0];
        let stores = AppStores::new(api, SelectedState::default());
        let mut session = ViewerSession::new(stores, src, Viewport::default());
        session.load().await.unwrap();
        assert!(session.scene().unwrap().cloud().background().is_some());

        session
            .stores_mut()
            .selected
            .update(|s| s.update_genes(strings(&["Gad1"])));
        session.sync().await.unwrap();
        // Reordered to [8,4,2,0]: the first cell is now the hottest.
        let colors = main_colors(&session);
        assert_eq!(colors[0], Rgb8::new(255, 0, 0));
        assert_eq!(colors[3], Rgb8::new(0, 0, 255));
        // Sizes are scaled down for this dataset.
        assert_eq!(session.scene().unwrap().cloud().main().sizes[0], 0.1);
    }

    #[tokio::test]
    async fn dot_size_change_reaches_uniform() {
        let mut session = loaded(PREFIX, Arc::new(source(PREFIX))).await;
        session.sync().await.unwrap();
        let applied = session.stores_mut().button.update(|b| b.update_dot_size(25.0));
        assert_eq!(applied, 25.0);
        session.sync().await.unwrap();
        assert_eq!(session.scene().unwrap().dot_size(), 25.0);
        assert_eq!(session.events().count(kinds::DOT_SIZE), 2);
    }
}
