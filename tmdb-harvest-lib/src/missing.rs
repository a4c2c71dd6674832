//! Report of work items that still have no poster.

use std::path::Path;

use crate::checkpoint::has_poster;
use crate::error::HarvestError;
use crate::work::{MovieId, read_work_list};

/// Ids from `movies_csv` with no (non-empty) `<id>.jpg` in `poster_dir`.
pub fn find_missing_posters(
    movies_csv: &Path,
    poster_dir: &Path,
) -> Result<Vec<MovieId>, HarvestError> {
    let ids = read_work_list(movies_csv)?;
    Ok(ids
        .into_iter()
        .filter(|id| !has_poster(poster_dir, *id))
        .collect())
}

/// Write `missing_movie_ids.csv`: a `movieId` header and one id per row.
pub fn write_missing_ids(path: &Path, ids: &[MovieId]) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["movieId"])?;
    for id in ids {
        writer.write_record([id.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_posters_listed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let movies = dir.path().join("movies.csv");
        std::fs::write(&movies, "movieId,title\n1,A\n2,B\n3,C\n4,D\n").unwrap();
        let posters = dir.path().join("movie_posters");
        std::fs::create_dir(&posters).unwrap();
        std::fs::write(posters.join("2.jpg"), b"jpeg").unwrap();
        std::fs::write(posters.join("4.jpg"), b"").unwrap();

        let missing = find_missing_posters(&movies, &posters).unwrap();
        assert_eq!(missing, vec![MovieId(1), MovieId(3), MovieId(4)]);

        let out = dir.path().join("missing_movie_ids.csv");
        write_missing_ids(&out, &missing).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "movieId\n1\n3\n4\n"
        );
    }

    #[test]
    fn test_missing_poster_dir_means_all_missing() {
        let dir = tempfile::tempdir().unwrap();
        let movies = dir.path().join("movies.csv");
        std::fs::write(&movies, "movieId\n9\n").unwrap();
        let missing = find_missing_posters(&movies, &dir.path().join("none")).unwrap();
        assert_eq!(missing, vec![MovieId(9)]);
    }
}
