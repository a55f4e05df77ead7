use spanflow::model::{ArtifactId, Context, Execution, LineageAnchor};
use spanflow::{resolve, Artifact, ArtifactQuery, InMemoryMetadataStore, InputBuilder, MetadataStore, ResolveError,
               StoreError};

/// Store que falla en la lectura de linaje.
struct BrokenLineage {
    inner: InMemoryMetadataStore,
    error: StoreError,
}

impl MetadataStore for BrokenLineage {
    fn query_artifacts(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StoreError> {
        self.inner.query_artifacts(query)
    }

    fn get_lineage(&self, _anchor: LineageAnchor) -> Result<Vec<Execution>, StoreError> {
        Err(self.error.clone())
    }

    fn get_artifacts_by_id(&self, ids: &[ArtifactId]) -> Result<Vec<Artifact>, StoreError> {
        self.inner.get_artifacts_by_id(ids)
    }

    fn get_context(&self, type_name: &str, name: &str) -> Result<Option<Context>, StoreError> {
        self.inner.get_context(type_name, name)
    }
}

fn training_builder() -> InputBuilder {
    let mut b = InputBuilder::new();
    let models = b.artifact_query("Model").unwrap();
    let channel = b.training_range(&models).unwrap();
    b.bind("examples", &channel).unwrap();
    b
}

fn store_with_model(error: StoreError) -> BrokenLineage {
    let mut inner = InMemoryMetadataStore::new();
    inner.put_artifact("Model", &[]);
    BrokenLineage { inner, error }
}

#[test]
fn unavailable_store_propagates_unchanged() {
    let store = store_with_model(StoreError::Unavailable("connection refused".into()));
    let err = resolve(&store, training_builder()).unwrap_err();
    assert_eq!(err, ResolveError::StoreUnavailable("connection refused".into()));
}

#[test]
fn corrupt_record_is_an_internal_error() {
    let store = store_with_model(StoreError::Corrupt("execution 7".into()));
    let err = resolve(&store, training_builder()).unwrap_err();
    assert!(matches!(err, ResolveError::Internal(ref m) if m.contains("execution 7")));
}

#[test]
fn failing_lineage_is_not_touched_without_models() {
    let store = BrokenLineage { inner: InMemoryMetadataStore::new(),
                                error: StoreError::Unavailable("down".into()) };
    let outcome = resolve(&store, training_builder()).unwrap();
    assert!(outcome.is_skip());
}
