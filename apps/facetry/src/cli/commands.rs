//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use facetry_core::{
    MetamodelConfig, MetamodelContext, MetamodelError, ModelMetrics, ObjectSpecification,
    TypeCatalog, ValidationFailures,
    export::{
        CanonicalSpecification, MetamodelSnapshot, canonical_checksum, canonical_crypto_hash,
        export_canonical, verify_canonical,
    },
    reflect::CatalogDocument,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for catalogs and configuration (16 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum file size for verification input (64 MB).
///
/// Matches the largest payload the canonical decoder accepts.
const MAX_EXPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MetamodelError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MetamodelError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MetamodelError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MetamodelError> {
    let canonical = path.canonicalize().map_err(|e| {
        MetamodelError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MetamodelError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against its (existing) parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, MetamodelError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        MetamodelError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(MetamodelError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| MetamodelError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn read_text(path: &Path) -> Result<String, MetamodelError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_CATALOG_FILE_SIZE)?;
    std::fs::read_to_string(&validated)
        .map_err(|e| MetamodelError::IoError(format!("Read file '{}': {}", path.display(), e)))
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// MODEL LOADING
// =============================================================================

/// Where the model comes from: a catalog and an optional configuration.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub catalog: &'a Path,
    pub config: Option<&'a Path>,
}

/// Load a catalog. `.json` files are read as JSON, anything else as TOML.
pub fn load_catalog(path: &Path) -> Result<TypeCatalog, MetamodelError> {
    let text = read_text(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let catalog = if is_json {
        let document: CatalogDocument = serde_json::from_str(&text)
            .map_err(|e| MetamodelError::DeserializationError(e.to_string()))?;
        TypeCatalog::from_document(document)?
    } else {
        TypeCatalog::from_toml_str(&text)?
    };

    tracing::info!(path = %path.display(), types = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Load the engine configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<MetamodelConfig, MetamodelError> {
    match path {
        Some(path) => MetamodelConfig::from_toml_str(&read_text(path)?),
        None => Ok(MetamodelConfig::default()),
    }
}

/// Build and bootstrap a context.
///
/// With `lenient`, validation failures are returned instead of aborting.
fn bootstrap(
    source: &Source<'_>,
    lenient: bool,
) -> Result<(MetamodelContext, ValidationFailures), MetamodelError> {
    let catalog = load_catalog(source.catalog)?;
    let mut config = load_config(source.config)?;
    if lenient {
        config.validation.fatal = false;
    }

    let context = MetamodelContext::new(catalog, config);
    let failures = context.bootstrap()?;
    Ok((context, failures))
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Bootstrap the catalog and report every validation failure.
pub fn cmd_validate(source: &Source<'_>, json_mode: bool) -> Result<(), MetamodelError> {
    let (context, failures) = bootstrap(source, true)?;
    let count = context.specifications().len();

    if json_mode {
        print_json(&serde_json::json!({
            "valid": failures.is_empty(),
            "specifications": count,
            "failures": &failures,
        }));
    } else if failures.is_empty() {
        println!("Model is valid ({} specifications)", count);
    } else {
        println!("Validation failed ({} failures)", failures.len());
        println!();
        for failure in &failures {
            println!("  {}", failure);
        }
    }

    failures.into_result()
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Show the specification of one type.
pub fn cmd_inspect(
    source: &Source<'_>,
    json_mode: bool,
    type_name: &str,
) -> Result<(), MetamodelError> {
    let (context, _) = bootstrap(source, true)?;
    let spec = context.specification(type_name)?;

    if json_mode {
        print_json(&CanonicalSpecification::from(spec.as_ref()));
        return Ok(());
    }

    print_specification(&spec);
    Ok(())
}

fn print_specification(spec: &ObjectSpecification) {
    let specialization = spec
        .specialization()
        .map_or("incomplete", |s| s.name());

    println!("{} ({})", spec.type_name(), specialization);
    println!("{}", "=".repeat(spec.type_name().len() + specialization.len() + 3));
    println!("Name:         {}", spec.display_name());
    println!("Instantiable: {}", spec.is_instantiable());
    if let Some(superclass) = spec.superclass() {
        println!("Extends:      {}", superclass);
    }
    for facet in spec.facets().iter() {
        println!("  @{} [{}]", facet.kind(), facet.precedence());
    }

    println!();
    println!("Members:");
    for member in spec.members() {
        println!(
            "  {} {} : {} \"{}\"",
            member.feature_type,
            member.id,
            member.return_type,
            member.display_name()
        );
        for facet in member.facets.iter() {
            let attributes = facetry_core::facet::describe_attributes(&facet.attributes());
            println!("      @{} [{}] {}", facet.kind(), facet.precedence(), attributes);
        }
        for param in &member.parameters {
            println!(
                "      #{} {} : {}",
                param.index,
                param.display_name(),
                param.type_ref
            );
        }
    }

    if !spec.rejected_methods().is_empty() {
        println!();
        println!("Rejected:");
        for rejected in spec.rejected_methods() {
            println!("  {} (prefix '{}')", rejected.method, rejected.prefix);
        }
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show model metrics.
pub fn cmd_status(source: &Source<'_>, json_mode: bool) -> Result<(), MetamodelError> {
    let (context, failures) = bootstrap(source, true)?;
    let metrics = ModelMetrics::from_specifications(&context.specifications());

    if json_mode {
        print_json(&serde_json::json!({
            "catalog": source.catalog.to_string_lossy(),
            "metrics": metrics,
            "validation_failures": failures.len(),
        }));
        return Ok(());
    }

    println!("Facetry Model Status");
    println!("====================");
    println!("Catalog: {:?}", source.catalog);
    println!();
    println!("Specifications: {}", metrics.specification_count);
    for (specialization, count) in &metrics.by_specialization {
        println!("  {:<12} {}", specialization.name(), count);
    }
    println!("Properties:     {}", metrics.property_count);
    println!("Collections:    {}", metrics.collection_count);
    println!("Actions:        {}", metrics.action_count);
    println!("Parameters:     {}", metrics.parameter_count);
    println!("Facets:         {}", metrics.facet_count);
    println!("Failures:       {}", failures.len());

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the metamodel. Refuses an invalid model when validation is fatal.
pub fn cmd_export(source: &Source<'_>, output: &Path, format: &str) -> Result<(), MetamodelError> {
    let validated_output = validate_output_path(output)?;
    let (context, _) = bootstrap(source, false)?;
    let specs = context.specifications();

    let data = match format {
        "canonical" => {
            let data = export_canonical(&specs)?;
            let checksum = canonical_checksum(&specs)?;
            println!("Checksum: {}", checksum);
            data
        }
        "json" => serde_json::to_vec_pretty(&MetamodelSnapshot::from_specifications(&specs))
            .map_err(|e| MetamodelError::SerializationError(e.to_string()))?,
        _ => {
            return Err(MetamodelError::SerializationError(format!(
                "Unknown format: {}. Use: canonical, json",
                format
            )));
        }
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| MetamodelError::IoError(format!("Write file: {}", e)))?;

    tracing::info!(bytes = data.len(), format, "metamodel exported");
    println!("Exported {} bytes to {:?}", data.len(), validated_output);

    Ok(())
}

// =============================================================================
// VERIFY COMMAND
// =============================================================================

/// Check that a canonical export matches what the catalog produces now.
pub fn cmd_verify(source: &Source<'_>, json_mode: bool, input: &Path) -> Result<(), MetamodelError> {
    let validated_input = validate_file_path(input)?;
    validate_file_size(&validated_input, MAX_EXPORT_FILE_SIZE)?;
    let data = std::fs::read(&validated_input)
        .map_err(|e| MetamodelError::IoError(format!("Read file: {}", e)))?;

    let (context, _) = bootstrap(source, true)?;
    let matches = verify_canonical(&context.specifications(), &data)?;

    if json_mode {
        print_json(&serde_json::json!({ "matches": matches }));
    } else if matches {
        println!("Export matches catalog");
    } else {
        println!("Export does NOT match catalog");
    }

    if !matches {
        return Err(MetamodelError::DeserializationError(
            "export does not match the current catalog".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Compute the BLAKE3 hash of the canonical export.
pub fn cmd_hash(source: &Source<'_>, json_mode: bool) -> Result<(), MetamodelError> {
    let (context, _) = bootstrap(source, true)?;
    let specs = context.specifications();
    let hash = canonical_crypto_hash(&specs)?;

    if json_mode {
        print_json(&serde_json::json!({
            "algorithm": "blake3",
            "hash": hash,
            "specifications": specs.len(),
        }));
    } else {
        println!("BLAKE3: {}", hash);
    }

    Ok(())
}
