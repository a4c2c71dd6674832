use super::*;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_movie_id_parse() {
    assert_eq!("42".parse::<MovieId>(), Ok(MovieId(42)));
    assert_eq!(" 7 ".parse::<MovieId>(), Ok(MovieId(7)));
    assert!("abc".parse::<MovieId>().is_err());
    assert!("-1".parse::<MovieId>().is_err());
}

#[test]
fn test_tmdb_id_rejects_blank() {
    assert_eq!(TmdbId::new("  "), None);
    assert_eq!(TmdbId::new(" 550 ").unwrap().as_str(), "550");
}

#[test]
fn test_read_work_list_keeps_order_and_drops_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "movies.csv",
        "movieId,title,genres\n3,\"Heat, The (1995)\",Action\n1,Toy Story (1995),Animation\n3,dup,x\n2,Jumanji (1995),Adventure\n",
    );
    let ids = read_work_list(&path).unwrap();
    assert_eq!(ids, vec![MovieId(3), MovieId(1), MovieId(2)]);
}

#[test]
fn test_read_work_list_skips_malformed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "movies.csv", "movieId,title\nfoo,bar\n5,Five\n\n6,Six\n");
    let ids = read_work_list(&path).unwrap();
    assert_eq!(ids, vec![MovieId(5), MovieId(6)]);
}

#[test]
fn test_read_work_list_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "movies.csv", "movieId,title\n");
    assert!(read_work_list(&path).unwrap().is_empty());
}

#[test]
fn test_read_work_list_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_work_list(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, HarvestError::MissingInput(_)));
}

#[test]
fn test_read_work_list_keeps_rows_with_non_utf8_titles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movies.csv");
    std::fs::write(&path, b"movieId,title\n1,A\n2,B\xff\n3,C\n").unwrap();
    let ids = read_work_list(&path).unwrap();
    assert_eq!(ids, vec![MovieId(1), MovieId(2), MovieId(3)]);
}
