use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use csv::StringRecord;
use tracing::{debug, info};

use crate::cache::Fingerprint;
use crate::error::{Error, Result};
use crate::tfidf::FeatureIndex;
use crate::types::Recipe;

pub const MAGIC: [u8; 4] = *b"NDB0";
pub const VERSION: u8 = 1;

/// Loads the recipe catalog from a CSV file with a header row. Extra
/// columns are ignored.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Recipe>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| unavailable(path, e))?;

    let mut recipes = Vec::new();
    let mut ids = HashSet::new();
    for row in reader.deserialize::<Recipe>() {
        let recipe = row.map_err(|e| unavailable(path, e))?;
        validate(&recipe).map_err(|e| unavailable(path, e))?;
        if !ids.insert(recipe.id) {
            return Err(unavailable(path, format!("duplicate recipe id {}", recipe.id)));
        }
        recipes.push(recipe);
    }
    info!(path = %path.display(), recipes = recipes.len(), "loaded recipe catalog");
    Ok(recipes)
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::DataUnavailable(format!("{}: {}", path.display(), e))
}

fn validate(recipe: &Recipe) -> std::result::Result<(), String> {
    let m = recipe.macros();
    for nutrient in crate::types::Nutrient::ALL {
        let v = m.get(nutrient);
        if !v.is_finite() || v < 0.0 {
            return Err(format!("recipe {} has invalid {} value {}", recipe.id, nutrient, v));
        }
    }
    Ok(())
}

/// Reads every row of a headered CSV file. A missing file reads as empty.
pub fn read_rows<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Rewrites the whole file with `rows`. Data goes to a sibling temp file
/// first and is renamed over the target.
pub fn write_rows<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), rows = rows.len(), "rewrote csv");
    Ok(())
}

/// Appends one row. A new or empty file gets the row's own header; an
/// existing file keeps its header and the row is laid out in that column
/// order, with blanks for columns the row does not carry.
pub fn append_row<T: Serialize, P: AsRef<Path>>(path: P, row: &T) -> Result<()> {
    let path = path.as_ref();
    let (fields, values) = to_record(row)?;
    let existing = existing_headers(path)?;
    let record = match &existing {
        Some(headers) => reorder(path, headers, &fields, &values)?,
        None => values,
    };
    let needs_newline = existing.is_some() && !ends_with_newline(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_newline {
        file.write_all(b"\n")?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if existing.is_none() {
        writer.write_record(&fields)?;
    }
    writer.write_record(&record)?;
    writer.flush()?;
    Ok(())
}

/// Serializes `row` into its header names and field values.
fn to_record<T: Serialize>(row: &T) -> Result<(StringRecord, StringRecord)> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(row)?;
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let fields = reader.headers()?.clone();
    let values = reader
        .records()
        .next()
        .transpose()?
        .unwrap_or_else(StringRecord::new);
    Ok((fields, values))
}

fn existing_headers(path: &Path) -> Result<Option<StringRecord>> {
    if fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true) {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path)?;
    Ok(Some(reader.headers()?.clone()))
}

fn reorder(
    path: &Path,
    headers: &StringRecord,
    fields: &StringRecord,
    values: &StringRecord,
) -> Result<StringRecord> {
    if let Some(missing) = fields.iter().find(|f| !headers.iter().any(|h| h == *f)) {
        return Err(Error::DataUnavailable(format!(
            "{}: no column for field {}",
            path.display(),
            missing
        )));
    }
    Ok(headers
        .iter()
        .map(|h| {
            fields
                .iter()
                .position(|f| f == h)
                .and_then(|i| values.get(i))
                .unwrap_or("")
        })
        .collect())
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    if file.seek(SeekFrom::End(-1)).is_err() {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[derive(Serialize, Deserialize)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u8,
    pub fingerprint: Fingerprint,
}

/// A built feature index persisted together with the fingerprint of the
/// catalog and params it was built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub fingerprint: Fingerprint,
    pub index: FeatureIndex,
}

impl IndexSnapshot {
    /// Writes to a sibling temp file and renames it over `path`, so a
    /// reader never sees a partial snapshot.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tmp = tmp_path(path);
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            fingerprint: self.fingerprint,
        };
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &header)?;
        bincode::serialize_into(&mut writer, &self.index)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let header: Header = bincode::deserialize_from(&mut reader)?;
        if header.magic != MAGIC {
            return Err(Error::StaleSnapshot("invalid magic".into()));
        }
        if header.version != VERSION {
            return Err(Error::StaleSnapshot(format!(
                "unsupported version {}",
                header.version
            )));
        }
        let index: FeatureIndex = bincode::deserialize_from(&mut reader)?;
        Ok(Self {
            fingerprint: header.fingerprint,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "id,label,ingredients,ingredient_lines,proteins_per_serving,calories_per_serving,fats_per_serving,carbs_per_serving,url\n";

    #[test]
    fn loads_catalog_with_extra_columns() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(
            &path,
            "id,label,ingredients,ingredient_lines,proteins_per_serving,calories_per_serving,fats_per_serving,carbs_per_serving,url,diet\n\
             7,Soup,\"leek, potato\",,4,210.5,6,30,,vegan\n",
        )?;
        let recipes = load_catalog(&path)?;
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, 7);
        assert_eq!(recipes[0].ingredients, "leek, potato");
        assert_eq!(recipes[0].calories_per_serving, 210.5);
        assert_eq!(recipes[0].ingredient_lines, "");
        assert_eq!(recipes[0].url, "");
        Ok(())
    }

    #[test]
    fn missing_url_column_is_unavailable() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(
            &path,
            "id,label,ingredients,ingredient_lines,proteins_per_serving,calories_per_serving,fats_per_serving,carbs_per_serving\n\
             7,Soup,leek,leek,4,210.5,6,30\n",
        )?;
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(&err, Error::DataUnavailable(msg) if msg.contains("url")));
        Ok(())
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_catalog("does-not-exist.csv").unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn non_numeric_macro_is_unavailable() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(&path, format!("{HEADER}1,A,egg,egg,lots,100,1,1,u\n"))?;
        assert!(matches!(load_catalog(&path), Err(Error::DataUnavailable(_))));
        Ok(())
    }

    #[test]
    fn negative_macro_is_unavailable() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(&path, format!("{HEADER}1,A,egg,egg,5,-100,1,1,u\n"))?;
        assert!(matches!(load_catalog(&path), Err(Error::DataUnavailable(_))));
        Ok(())
    }

    #[test]
    fn missing_column_is_unavailable() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(&path, "id,label,ingredients\n1,A,egg\n")?;
        assert!(matches!(load_catalog(&path), Err(Error::DataUnavailable(_))));
        Ok(())
    }

    #[test]
    fn duplicate_id_is_unavailable() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.csv");
        fs::write(
            &path,
            format!("{HEADER}1,A,egg,egg,5,100,1,1,u\n1,B,ham,ham,5,100,1,1,u\n"),
        )?;
        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        Ok(())
    }

    #[test]
    fn write_rows_replaces_contents() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rows.csv");
        write_rows(&path, &[("a".to_string(), 1u32), ("b".to_string(), 2)])?;
        write_rows(&path, &[("c".to_string(), 3u32)])?;
        let rows: Vec<(String, u32)> = read_rows_headerless(&path)?;
        assert_eq!(rows, vec![("c".to_string(), 3)]);
        assert!(!tmp_path(&path).exists());
        Ok(())
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        id: String,
        qty: u32,
    }

    #[test]
    fn append_row_follows_existing_column_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rows.csv");
        fs::write(&path, "qty,note,id\n1,first,a")?;
        append_row(&path, &Row { id: "b".into(), qty: 2 })?;
        assert_eq!(fs::read_to_string(&path)?, "qty,note,id\n1,first,a\n2,,b\n");
        let rows: Vec<Row> = read_rows(&path)?;
        assert_eq!(rows, vec![Row { id: "a".into(), qty: 1 }, Row { id: "b".into(), qty: 2 }]);
        Ok(())
    }

    #[test]
    fn append_row_writes_header_for_new_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rows.csv");
        append_row(&path, &Row { id: "a".into(), qty: 1 })?;
        append_row(&path, &Row { id: "b".into(), qty: 2 })?;
        assert_eq!(fs::read_to_string(&path)?, "id,qty\na,1\nb,2\n");
        Ok(())
    }

    #[test]
    fn append_row_needs_a_column_per_field() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rows.csv");
        fs::write(&path, "id,note\na,x\n")?;
        let err = append_row(&path, &Row { id: "b".into(), qty: 2 }).unwrap_err();
        assert!(err.to_string().contains("qty"));
        assert_eq!(fs::read_to_string(&path)?, "id,note\na,x\n");
        Ok(())
    }

    #[test]
    fn snapshot_save_leaves_no_temp_file() -> anyhow::Result<()> {
        use crate::params::Params;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("index.ndb");
        let params = Params::default();
        let snapshot = IndexSnapshot {
            fingerprint: Fingerprint::of(&[], &params),
            index: FeatureIndex::build(&["egg ham", "ham cheese"], &params),
        };
        fs::write(&path, b"old contents")?;
        snapshot.save(&path)?;
        assert!(!tmp_path(&path).exists());
        assert_eq!(IndexSnapshot::load(&path)?, snapshot);
        Ok(())
    }

    fn read_rows_headerless<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
        Ok(reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?)
    }
}
