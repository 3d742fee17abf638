//! Write-then-read tests for every format over every compression layer.

use recordio::testing::{assert_file_records, numbered_records, sample_records, TempDirPath};
use recordio::{open, read_all, write_all, Mode, OpenOptions};

fn roundtrip(file_name: &str) -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path(file_name);

    let written = write_all(&path, &sample_records())?;
    assert_eq!(written, 3);
    assert_file_records(&path, &sample_records());
    Ok(())
}

fn append(file_name: &str) -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path(file_name);
    let records = numbered_records(5);

    write_all(&path, &records[..2])?;
    let mut file = open(&path, Mode::Append)?;
    assert_eq!(file.write_all(&records[2..])?, 3);
    file.close()?;

    assert_file_records(&path, &records);
    Ok(())
}

#[cfg(feature = "format-jsonl")]
mod newlinejson {
    use super::*;

    #[test]
    fn test_plain() -> anyhow::Result<()> {
        roundtrip("ais.json")
    }

    #[test]
    fn test_alternate_extensions() -> anyhow::Result<()> {
        for name in ["ais.jsonl", "ais.ndjson", "ais.nljson"] {
            roundtrip(name)?;
        }
        Ok(())
    }

    #[test]
    fn test_append() -> anyhow::Result<()> {
        append("ais.json")
    }

    #[test]
    fn test_written_bytes_are_one_object_per_line() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path("ais.json");
        write_all(&path, &numbered_records(2))?;

        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        for line in lines {
            assert!(line.starts_with('{') && line.ends_with('}'));
        }
        Ok(())
    }

    #[test]
    fn test_empty_file() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path("empty.json");
        write_all(&path, &[])?;
        assert!(read_all(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_truncates() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path("ais.json");
        write_all(&path, &numbered_records(4))?;
        write_all(&path, &sample_records())?;
        assert_file_records(&path, &sample_records());
        Ok(())
    }

    #[test]
    fn test_creates_parent_directories() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.path().join("2014").join("12").join("ais.json");
        write_all(&path, &sample_records())?;
        assert_file_records(&path, &sample_records());
        Ok(())
    }

    #[test]
    fn test_records_come_back_in_order() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path("ordered.json");
        write_all(&path, &numbered_records(100))?;

        let ids: Vec<u64> = open(&path, Mode::Read)?
            .map(|r| r.map(|record| record["id"].as_u64().unwrap_or(u64::MAX)))
            .collect::<recordio::Result<_>>()?;
        assert_eq!(ids, (0..100).collect::<Vec<u64>>());
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn test_gzip() -> anyhow::Result<()> {
        roundtrip("ais.json.gz")
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn test_gzip_append() -> anyhow::Result<()> {
        append("ais.json.gz")
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn test_zstd() -> anyhow::Result<()> {
        roundtrip("ais.json.zst")
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn test_zstd_append() -> anyhow::Result<()> {
        append("ais.json.zstd")
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn test_bzip2() -> anyhow::Result<()> {
        roundtrip("ais.json.bz2")
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn test_bzip2_append() -> anyhow::Result<()> {
        append("ais.json.bz2")
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn test_xz() -> anyhow::Result<()> {
        roundtrip("ais.json.xz")
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn test_xz_append() -> anyhow::Result<()> {
        append("ais.json.xz")
    }
}

#[cfg(feature = "format-msgpack")]
mod msgpack {
    use super::*;

    #[test]
    fn test_plain() -> anyhow::Result<()> {
        roundtrip("ais.msgpack")?;
        roundtrip("ais.msg")
    }

    #[test]
    fn test_append() -> anyhow::Result<()> {
        append("ais.msgpack")
    }

    #[test]
    fn test_empty_file() -> anyhow::Result<()> {
        let dir = TempDirPath::new()?;
        let path = dir.file_path("empty.msgpack");
        write_all(&path, &[])?;
        assert_eq!(std::fs::metadata(&path)?.len(), 0);
        assert!(read_all(&path)?.is_empty());
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn test_gzip() -> anyhow::Result<()> {
        roundtrip("ais.msgpack.gz")
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn test_gzip_append() -> anyhow::Result<()> {
        append("ais.msgpack.gzip")
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn test_zstd() -> anyhow::Result<()> {
        roundtrip("ais.msgpack.zst")
    }

    #[cfg(feature = "compression-bzip2")]
    #[test]
    fn test_bzip2() -> anyhow::Result<()> {
        roundtrip("ais.msgpack.bz2")
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn test_xz() -> anyhow::Result<()> {
        roundtrip("ais.msgpack.xz")
    }

    #[cfg(feature = "compression-xz")]
    #[test]
    fn test_xz_append() -> anyhow::Result<()> {
        append("ais.msgpack.xz")
    }
}

#[cfg(all(feature = "format-jsonl", feature = "format-msgpack"))]
#[test]
fn test_explicit_drivers_override_path() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("ais.bin");

    let mut out = OpenOptions::new(Mode::Write).driver("msgpack").open(&path)?;
    out.write_all(&sample_records())?;
    out.close()?;

    assert!(matches!(
        read_all(&path),
        Err(recordio::Error::UndetectableFormat { .. })
    ));
    let records = OpenOptions::new(Mode::Read)
        .driver("msgpack")
        .open(&path)?
        .collect::<recordio::Result<Vec<_>>>()?;
    assert_eq!(records, sample_records());
    Ok(())
}

#[cfg(all(feature = "format-jsonl", feature = "compression-gzip"))]
#[test]
fn test_compression_none_writes_plain_bytes() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("plain.json.gz");

    let mut out = OpenOptions::new(Mode::Write).compression("none").open(&path)?;
    out.write_all(&numbered_records(1))?;
    out.close()?;

    assert!(std::fs::read_to_string(&path)?.starts_with('{'));
    Ok(())
}

#[cfg(all(feature = "format-jsonl", feature = "compression-gzip"))]
#[test]
fn test_gzip_output_is_gzip() -> anyhow::Result<()> {
    use std::io::Read;

    let dir = TempDirPath::new()?;
    let path = dir.file_path("ais.json.gz");
    write_all(&path, &numbered_records(2))?;

    let mut text = String::new();
    flate2::read::GzDecoder::new(std::fs::File::open(&path)?).read_to_string(&mut text)?;
    assert_eq!(text.lines().count(), 2);
    Ok(())
}

#[cfg(all(feature = "format-jsonl", feature = "compression-zstd"))]
#[test]
fn test_compression_level_option() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("ais.json.zst");

    let mut out = OpenOptions::new(Mode::Write)
        .compression_option("level", 19)
        .open(&path)?;
    out.write_all(&numbered_records(50))?;
    out.close()?;

    assert_file_records(&path, &numbered_records(50));
    Ok(())
}
