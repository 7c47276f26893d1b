//! End-to-end tests: build an index, persist it, serve it.

use data_loader::{MovieRow, MovieTable};
use pipeline::{ArtifactStore, BuildConfig, IndexBuilder};
use recommender::{LookupError, RecommendationService};
use tempfile::tempdir;

fn row(id: u32, title: &str, overview: &str, genre: &str) -> MovieRow {
    MovieRow {
        movie_id: Some(id),
        title: title.to_string(),
        overview: overview.to_string(),
        genres: format!(r#"[{{"id": 1, "name": "{genre}"}}]"#),
        keywords: r#"[{"id": 7, "name": "based on novel"}]"#.to_string(),
        cast: "[]".to_string(),
        crew: "[]".to_string(),
    }
}

/// A and B have identical features; C shares nothing with either
fn create_service(dir: &std::path::Path) -> RecommendationService {
    let mut table = MovieTable::new();
    table.push(row(1, "A", "space marine robot war", "Action"));
    table.push(row(2, "B", "space marine robot war", "Action"));
    table.push(row(3, "C", "quiet village romance", "Romance"));

    let config = BuildConfig::default().with_components(1).with_top_k(2);
    let built = IndexBuilder::new(config).build(&table).unwrap();
    ArtifactStore::new(dir).save(&built).unwrap();

    RecommendationService::load(dir).unwrap()
}

#[test]
fn test_identical_movies_recommend_each_other() {
    let dir = tempdir().unwrap();
    let service = create_service(dir.path());

    let recs = service.recommend("A", 2).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].title, "B");
    assert_eq!(recs[0].movie_id, Some(2));
    assert!((recs[0].score - 1.0).abs() < 1e-5);
    assert_eq!(recs[1].title, "C");
    assert!(recs[0].score > recs[1].score);
}

#[test]
fn test_loaded_service_answers_like_built_one() {
    let dir = tempdir().unwrap();
    let service = create_service(dir.path());

    assert_eq!(service.list_titles(), vec!["A", "B", "C"]);
    assert_eq!(service.k(), 2);
    assert_eq!(service.recommend("C", 5).unwrap().len(), 2);
    assert_eq!(
        service.recommend("D", 5),
        Err(LookupError::TitleNotFound("D".to_string()))
    );
}

#[test]
fn test_load_from_empty_directory_fails() {
    let dir = tempdir().unwrap();
    assert!(RecommendationService::load(dir.path()).is_err());
}
