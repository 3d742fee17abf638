//! Tests for the driver registry.

use recordio::driver::{CompressionDriver, Driver, Family, FormatDriver, RecordStream};
use recordio::io::stream::ByteStream;
use recordio::{registry, DriverOptions, Error, Mode, Registry, Result};
use std::sync::Arc;

mod support;
use support::Passthrough;

/// Format driver with configurable metadata; never opened.
struct Described {
    name: &'static str,
    extensions: &'static [&'static str],
    modes: &'static [Mode],
}

impl Described {
    fn new(name: &'static str, extensions: &'static [&'static str]) -> Self {
        Self {
            name,
            extensions,
            modes: &Mode::ALL,
        }
    }
}

impl FormatDriver for Described {
    fn name(&self) -> &str {
        self.name
    }

    fn extensions(&self) -> &[&str] {
        self.extensions
    }

    fn modes(&self) -> &[Mode] {
        self.modes
    }

    fn open(
        &self,
        _stream: Box<dyn ByteStream>,
        mode: Mode,
        _options: &DriverOptions,
    ) -> Result<Box<dyn RecordStream>> {
        Err(Error::unsupported_mode(self.name, mode, &[]))
    }
}

#[test]
fn test_empty_registry_has_no_names() {
    let registry = Registry::new();
    assert!(registry.names(Family::Format).is_empty());
    assert!(registry.names(Family::Compression).is_empty());
    assert!(matches!(
        registry.format("newlinejson"),
        Err(Error::UnknownDriver { family: Family::Format, .. })
    ));
}

#[test]
fn test_lookup_returns_the_registered_driver() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    let driver: Arc<dyn FormatDriver> = Arc::new(Described::new("tabular", &["tab", "tsv"]));
    registry.register_format(Arc::clone(&driver))?;

    let by_name = registry.format("tabular")?;
    let by_ext = registry.format_for_extension("tsv")?;
    assert!(Arc::ptr_eq(&by_name, &driver));
    assert!(Arc::ptr_eq(&by_ext, &driver));

    let wrapped = registry.lookup_by_name(Family::Format, "tabular")?;
    assert!(wrapped.ptr_eq(&registry.lookup_by_extension(Family::Format, "tab")?));
    assert_eq!(wrapped.family(), Family::Format);
    assert_eq!(wrapped.extensions(), &["tab", "tsv"]);
    Ok(())
}

#[test]
fn test_extension_lookup_is_case_insensitive() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register_compression(Arc::new(Passthrough::new("plain", &["pln"])))?;

    for ext in ["pln", "PLN", ".pln", ".Pln"] {
        assert_eq!(registry.compression_for_extension(ext)?.name(), "plain");
    }
    assert!(registry.is_compression_extension("PLN"));
    assert!(!registry.is_compression_extension("gz"));
    Ok(())
}

#[test]
fn test_name_lookup_is_exact() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register_format(Arc::new(Described::new("tabular", &["tab"])))?;

    let Err(err) = registry.format("Tabular") else {
        panic!("lookup by name must be case-sensitive");
    };
    assert!(matches!(err, Error::UnknownDriver { ref name, .. } if name == "Tabular"));
    assert_eq!(err.to_string(), "unrecognized format driver: Tabular");
    Ok(())
}

#[test]
fn test_duplicate_name_is_rejected_and_table_unchanged() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register_format(Arc::new(Described::new("tabular", &["tab"])))?;

    let err = registry
        .register_format(Arc::new(Described::new("tabular", &["tsv"])))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateName { family: Family::Format, ref name } if name == "tabular"
    ));
    assert!(registry.format_for_extension("tsv").is_err());
    assert_eq!(registry.names(Family::Format), vec!["tabular"]);
    Ok(())
}

#[test]
fn test_duplicate_extension_is_rejected_and_table_unchanged() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register_format(Arc::new(Described::new("tabular", &["tab"])))?;

    let err = registry
        .register_format(Arc::new(Described::new("other", &["csv", "tab"])))
        .unwrap_err();
    match err {
        Error::DuplicateExtension {
            family,
            extension,
            owner,
        } => {
            assert_eq!(family, Family::Format);
            assert_eq!(extension, "tab");
            assert_eq!(owner, "tabular");
        }
        other => panic!("expected DuplicateExtension, got {other:?}"),
    }
    assert!(registry.format("other").is_err());
    assert!(registry.format_for_extension("csv").is_err());
    Ok(())
}

#[test]
fn test_families_are_independent() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    registry.register_format(Arc::new(Described::new("shared", &["shr"])))?;
    registry.register_compression(Arc::new(Passthrough::new("shared", &["shz"])))?;

    assert_eq!(registry.format("shared")?.name(), "shared");
    assert_eq!(registry.compression("shared")?.name(), "shared");
    assert!(registry.compression_for_extension("shr").is_err());
    Ok(())
}

#[test]
fn test_invalid_descriptors_are_rejected() {
    let cases: Vec<Described> = vec![
        Described::new("", &["x"]),
        Described::new("noext", &[]),
        Described::new("dotted", &[".tab"]),
        Described::new("multi", &["tar.gz"]),
        Described::new("upper", &["TAB"]),
        Described::new("empty-ext", &[""]),
        Described {
            name: "nomodes",
            extensions: &["nm"],
            modes: &[],
        },
    ];

    for driver in cases {
        let name = driver.name;
        let mut registry = Registry::new();
        let err = registry.register_format(Arc::new(driver)).unwrap_err();
        assert!(
            matches!(err, Error::InvalidDescriptor { .. }),
            "{name}: expected InvalidDescriptor, got {err:?}"
        );
        assert!(registry.names(Family::Format).is_empty());
    }
}

#[test]
fn test_register_dispatches_on_family() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    let driver: Arc<dyn CompressionDriver> = Arc::new(Passthrough::new("plain", &["pln"]));
    registry.register(Driver::from(driver))?;

    assert_eq!(registry.names(Family::Compression), vec!["plain"]);
    assert!(registry.names(Family::Format).is_empty());
    Ok(())
}

#[test]
fn test_names_are_sorted() -> anyhow::Result<()> {
    let mut registry = Registry::new();
    for (name, ext) in [("zeta", &["z"]), ("alpha", &["a"]), ("mid", &["m"])] {
        registry.register_compression(Arc::new(Passthrough::new(name, ext)))?;
    }
    assert_eq!(registry.names(Family::Compression), vec!["alpha", "mid", "zeta"]);
    Ok(())
}

#[cfg(all(
    feature = "format-jsonl",
    feature = "format-msgpack",
    feature = "compression-gzip",
    feature = "compression-zstd",
    feature = "compression-bzip2",
    feature = "compression-xz"
))]
#[test]
fn test_builtins() -> anyhow::Result<()> {
    let registry = Registry::with_builtins()?;
    assert_eq!(registry.names(Family::Format), vec!["msgpack", "newlinejson"]);
    assert_eq!(
        registry.names(Family::Compression),
        vec!["bzip2", "gzip", "xz", "zstd"]
    );
    for ext in ["json", "jsonl", "ndjson", "nljson"] {
        assert_eq!(registry.format_for_extension(ext)?.name(), "newlinejson");
    }
    assert_eq!(registry.format_for_extension("msg")?.name(), "msgpack");
    assert_eq!(registry.compression_for_extension("bz2")?.name(), "bzip2");
    assert_eq!(registry.compression_for_extension("zst")?.name(), "zstd");
    Ok(())
}

#[cfg(feature = "format-jsonl")]
#[test]
fn test_global_registry_identity_and_registration() -> anyhow::Result<()> {
    let first = registry::lookup_by_name(Family::Format, "newlinejson")?;
    let second = registry::lookup_by_extension(Family::Format, "JSONL")?;
    assert!(first.ptr_eq(&second));

    registry::register_compression(Arc::new(Passthrough::new("global-plain", &["gpln"])))?;
    assert_eq!(
        registry::lookup_by_extension(Family::Compression, "gpln")?.name(),
        "global-plain"
    );
    assert!(registry::names(Family::Compression)?.contains(&"global-plain".to_string()));
    assert!(registry::snapshot()?.compression("global-plain").is_ok());

    let err = registry::register_compression(Arc::new(Passthrough::new("global-plain", &["gpln2"])))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { .. }));
    Ok(())
}

#[cfg(feature = "format-jsonl")]
#[test]
fn test_concurrent_lookups() {
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..100 {
                    let driver = registry::lookup_by_extension(Family::Format, "json").unwrap();
                    assert_eq!(driver.name(), "newlinejson");
                }
            });
        }
    });
}
