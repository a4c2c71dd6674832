use super::*;

fn ids(raw: &[u64]) -> Vec<MovieId> {
    raw.iter().copied().map(MovieId).collect()
}

#[test]
fn test_result_log_created_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("movie_id_to_name.csv");
    let log = CsvResultLog::open(&path, "movieName").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "movieId,movieName\n");
    assert!(log.records().unwrap().is_empty());
}

#[test]
fn test_result_log_empty_file_gets_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie_id_to_name.csv");
    std::fs::write(&path, "").unwrap();

    let mut log = CsvResultLog::open(&path, "movieName").unwrap();
    log.persist(MovieId(1), &"Toy Story".to_string()).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "movieId,movieName\n1,Toy Story\n"
    );
    assert!(log.completed().unwrap().contains(&MovieId(1)));

    // Reopening a file that has rows leaves it alone
    let reopened = CsvResultLog::open(&path, "movieName").unwrap();
    assert_eq!(reopened.records().unwrap().len(), 1);
}

#[test]
fn test_result_log_persist_appends_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie_id_to_name.csv");
    let mut log = CsvResultLog::open(&path, "movieName").unwrap();

    log.persist(MovieId(1), &"Fight Club".to_string()).unwrap();
    log.persist(MovieId(2), &"Heat, The".to_string()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "movieId,movieName\n1,Fight Club\n2,\"Heat, The\"\n"
    );
    assert_eq!(log.get(MovieId(2)).unwrap().as_deref(), Some("Heat, The"));
}

#[test]
fn test_result_log_refuses_empty_value() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = CsvResultLog::open(dir.path().join("o.csv"), "movieName").unwrap();
    let err = log.persist(MovieId(4), &"   ".to_string()).unwrap_err();
    assert!(matches!(err, HarvestError::EmptyResult(MovieId(4))));
    assert!(log.completed().unwrap().is_empty());
}

#[test]
fn test_result_log_dedupes_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o.csv");
    std::fs::write(
        &path,
        "movieId,movieName\n1,First\n2,\n1,Second\n3,Third\n2,Late\n",
    )
    .unwrap();
    let log = CsvResultLog::open(&path, "movieName").unwrap();

    let records = log.records().unwrap();
    assert_eq!(
        records,
        vec![
            (MovieId(1), "First".to_string()),
            (MovieId(3), "Third".to_string()),
            (MovieId(2), "Late".to_string()),
        ]
    );
    let completed = log.completed().unwrap();
    assert_eq!(completed.len(), 3);
}

#[test]
fn test_completed_values_never_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o.csv");
    std::fs::write(&path, "movieId,movieName\n1,\n2, \n3,Ok\n").unwrap();
    let log = CsvResultLog::open(&path, "movieName").unwrap();
    let completed = log.completed().unwrap();
    assert_eq!(completed, ids(&[3]).into_iter().collect());
    for (_, value) in log.records().unwrap() {
        assert!(!value.is_empty());
    }
}

#[test]
fn test_dedupe_result_log_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o.csv");
    std::fs::write(&path, "movieId,movieName\n1,A\n1,B\n2,C\n").unwrap();
    let log = CsvResultLog::open(&path, "movieName").unwrap();

    assert_eq!(dedupe_result_log(&log).unwrap(), 1);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "movieId,movieName\n1,A\n2,C\n"
    );
    assert_eq!(dedupe_result_log(&log).unwrap(), 0);
    assert!(duplicate_ids(&log).unwrap().is_empty());
}

#[test]
fn test_duplicate_ids_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o.csv");
    std::fs::write(&path, "movieId,movieName\n1,A\n1,B\n1,C\n2,D\n").unwrap();
    let log = CsvResultLog::open(&path, "movieName").unwrap();
    let dups = duplicate_ids(&log).unwrap();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[&MovieId(1)], 3);
}

#[test]
fn test_poster_store_persist_and_completed() {
    let dir = tempfile::tempdir().unwrap();
    let poster_dir = dir.path().join("movie_posters");
    let mut store = PosterStore::open(&poster_dir).unwrap();

    store.persist(MovieId(7), &vec![0xFF, 0xD8, 0xFF]).unwrap();
    std::fs::write(poster_dir.join("8.jpg"), b"").unwrap();
    std::fs::write(poster_dir.join("notes.txt"), b"x").unwrap();
    std::fs::write(poster_dir.join("cover.jpg"), b"x").unwrap();

    assert_eq!(std::fs::read(store.poster_path(MovieId(7))).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    assert!(!poster_dir.join("7.jpg.part").exists());
    assert_eq!(store.completed().unwrap(), ids(&[7]).into_iter().collect());
}

#[test]
fn test_poster_store_refuses_empty_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PosterStore::open(dir.path()).unwrap();
    let err = store.persist(MovieId(1), &Vec::new()).unwrap_err();
    assert!(matches!(err, HarvestError::EmptyResult(_)));
}

#[test]
fn test_pending_file_seeded_from_input() {
    let dir = tempfile::tempdir().unwrap();
    let movies = dir.path().join("movies.csv");
    std::fs::write(&movies, "movieId,title\n1,A\n2,B\n").unwrap();
    let checkpoint = dir.path().join("for_movies_name.csv");

    let pending = PendingFile::open_or_seed(&checkpoint, &movies).unwrap();
    assert_eq!(pending.remaining().unwrap(), ids(&[1, 2]));

    // An existing checkpoint is reused, not re-seeded
    pending.remove(MovieId(1)).unwrap();
    let reopened = PendingFile::open_or_seed(&checkpoint, &movies).unwrap();
    assert_eq!(reopened.remaining().unwrap(), ids(&[2]));
}

#[test]
fn test_pending_file_existing_does_not_create() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint = dir.path().join("movies_copy.csv");
    assert!(PendingFile::existing(&checkpoint).is_none());
    assert!(!checkpoint.exists());

    std::fs::write(&checkpoint, "movieId\n7\n").unwrap();
    let pending = PendingFile::existing(&checkpoint).unwrap();
    assert_eq!(pending.remaining().unwrap(), ids(&[7]));
}

#[test]
fn test_pending_file_missing_seed() {
    let dir = tempfile::tempdir().unwrap();
    let err = PendingFile::open_or_seed(dir.path().join("c.csv"), &dir.path().join("movies.csv"))
        .unwrap_err();
    assert!(matches!(err, HarvestError::MissingInput(_)));
}

#[test]
fn test_pending_file_remove_is_immediate_and_keeps_other_rows() {
    let dir = tempfile::tempdir().unwrap();
    let movies = dir.path().join("movies.csv");
    std::fs::write(
        &movies,
        "movieId,title,genres\n1,\"Toy Story, The\",Animation\n2,Jumanji,Adventure\n3,Heat,Action\n",
    )
    .unwrap();
    let pending = PendingFile::open_or_seed(dir.path().join("copy.csv"), &movies).unwrap();

    pending.remove(MovieId(2)).unwrap();
    assert_eq!(pending.remaining().unwrap(), ids(&[1, 3]));

    let contents = std::fs::read_to_string(pending.path()).unwrap();
    assert_eq!(
        contents,
        "movieId,title,genres\n1,\"Toy Story, The\",Animation\n3,Heat,Action\n"
    );

    // Removing an id that is not present leaves the file intact
    pending.remove(MovieId(99)).unwrap();
    assert_eq!(pending.remaining().unwrap(), ids(&[1, 3]));
}

#[test]
fn test_pending_file_remove_copies_non_utf8_rows() {
    let dir = tempfile::tempdir().unwrap();
    let movies = dir.path().join("movies.csv");
    std::fs::write(&movies, b"movieId,title\n1,A\n2,B\xff\n3,C\n4,D\n").unwrap();
    let pending = PendingFile::open_or_seed(dir.path().join("copy.csv"), &movies).unwrap();

    pending.remove(MovieId(1)).unwrap();
    pending.remove(MovieId(3)).unwrap();

    assert_eq!(
        std::fs::read(pending.path()).unwrap(),
        b"movieId,title\n2,B\xff\n4,D\n".to_vec()
    );
    assert_eq!(pending.remaining().unwrap(), ids(&[2, 4]));
}

#[test]
fn test_pending_file_empty_means_done() {
    let dir = tempfile::tempdir().unwrap();
    let movies = dir.path().join("movies.csv");
    std::fs::write(&movies, "movieId\n1\n").unwrap();
    let pending = PendingFile::open_or_seed(dir.path().join("copy.csv"), &movies).unwrap();
    std::fs::write(pending.path(), "").unwrap();
    assert!(pending.remaining().unwrap().is_empty());
    std::fs::remove_file(pending.path()).unwrap();
    assert!(pending.remaining().unwrap().is_empty());
}

#[test]
fn test_derived_pending_subtracts_completed() {
    let completed: CompletedSet = ids(&[2, 4]).into_iter().collect();
    let pending = PendingSource::Derived
        .pending(&ids(&[1, 2, 3, 4]), &completed)
        .unwrap();
    assert_eq!(pending, ids(&[1, 3]));
    assert_eq!(count_completed(&ids(&[1, 2, 3, 4]), &completed), 2);
}

#[test]
fn test_checkpoint_pending_subtracts_completed() {
    let dir = tempfile::tempdir().unwrap();
    let movies = dir.path().join("movies.csv");
    std::fs::write(&movies, "movieId\n1\n2\n3\n").unwrap();
    let file = PendingFile::open_or_seed(dir.path().join("copy.csv"), &movies).unwrap();
    let source = PendingSource::CheckpointFile(file);

    // 2 was recorded but the checkpoint was never updated (crash in between)
    let completed: CompletedSet = ids(&[2]).into_iter().collect();
    let pending = source.pending(&[], &completed).unwrap();
    assert_eq!(pending, ids(&[1, 3]));

    source.mark_done(MovieId(1)).unwrap();
    assert_eq!(source.pending(&[], &completed).unwrap(), ids(&[3]));
}
