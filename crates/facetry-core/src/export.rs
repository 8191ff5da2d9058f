//! # Canonical Export Module
//!
//! A deterministic snapshot of the whole metamodel.
//!
//! Specifications are flattened into plain data (`MetamodelSnapshot`), sorted
//! by type name, with members in presentation order and facets in kind order.
//! The snapshot is encoded as a bit-exact `postcard` stream behind a small
//! header carrying a magic, a version, counts and a checksum:
//!
//! ```text
//! [header_len: u32 LE] [CanonicalHeader (postcard)] [MetamodelSnapshot (postcard)]
//! ```
//!
//! Two runs over the same catalog and configuration produce identical bytes.

use crate::facet::{Facet, FacetHolder, FacetKind, Precedence};
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_EXPORT_PAYLOAD_SIZE};
use crate::specification::{ObjectMember, ObjectSpecification, ParameterSpec, Specialization};
use crate::{FeatureType, MetamodelError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// HEADER
// =============================================================================

/// Header for canonical export files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],
    /// Format version for compatibility.
    pub version: u8,
    /// Number of specifications in the export.
    pub specification_count: u64,
    /// Number of members across all specifications.
    pub member_count: u64,
    /// Checksum of the payload section.
    pub checksum: u64,
}

impl CanonicalHeader {
    /// Create a header for a payload.
    #[must_use]
    pub fn new(specification_count: u64, member_count: u64, checksum: u64) -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
            specification_count,
            member_count,
            checksum,
        }
    }

    /// Validate magic and version.
    ///
    /// Error messages are kept generic.
    pub fn validate(&self) -> Result<(), MetamodelError> {
        if &self.magic != MAGIC_BYTES {
            return Err(MetamodelError::DeserializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(MetamodelError::DeserializationError(
                "Unsupported file version".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A facet flattened to its key, precedence and attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalFacet {
    pub kind: FacetKind,
    pub precedence: Precedence,
    pub attributes: Vec<(String, String)>,
}

/// An action parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalParameter {
    pub index: u64,
    pub type_ref: String,
    pub name: Option<String>,
    pub facets: Vec<CanonicalFacet>,
}

/// A property, collection or action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalMember {
    pub feature_type: FeatureType,
    pub id: String,
    pub identifier: String,
    pub return_type: String,
    pub facets: Vec<CanonicalFacet>,
    pub parameters: Vec<CanonicalParameter>,
}

/// One type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalSpecification {
    pub type_name: String,
    pub complete: bool,
    pub specialization: Option<Specialization>,
    pub instantiable: bool,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub facets: Vec<CanonicalFacet>,
    pub members: Vec<CanonicalMember>,
    pub rejected: Vec<String>,
}

/// The whole metamodel as plain, ordered data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetamodelSnapshot {
    /// Specifications sorted by type name.
    pub specifications: Vec<CanonicalSpecification>,
}

fn canonical_facets(holder: &FacetHolder) -> Vec<CanonicalFacet> {
    holder.iter().map(canonical_facet).collect()
}

fn canonical_facet(facet: &dyn Facet) -> CanonicalFacet {
    CanonicalFacet {
        kind: facet.kind(),
        precedence: facet.precedence(),
        attributes: facet
            .attributes()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

impl From<&ParameterSpec> for CanonicalParameter {
    fn from(param: &ParameterSpec) -> Self {
        Self {
            index: param.index as u64,
            type_ref: param.type_ref.to_string(),
            name: param.name.clone(),
            facets: canonical_facets(&param.facets),
        }
    }
}

impl From<&ObjectMember> for CanonicalMember {
    fn from(member: &ObjectMember) -> Self {
        Self {
            feature_type: member.feature_type,
            id: member.id.clone(),
            identifier: member.identifier.to_string(),
            return_type: member.return_type.to_string(),
            facets: canonical_facets(&member.facets),
            parameters: member.parameters.iter().map(CanonicalParameter::from).collect(),
        }
    }
}

impl From<&ObjectSpecification> for CanonicalSpecification {
    fn from(spec: &ObjectSpecification) -> Self {
        Self {
            type_name: spec.type_name().to_string(),
            complete: spec.is_complete(),
            specialization: spec.specialization(),
            instantiable: spec.is_instantiable(),
            superclass: spec.superclass().map(str::to_string),
            interfaces: spec.interfaces().to_vec(),
            facets: canonical_facets(spec.facets()),
            members: spec.members().iter().map(CanonicalMember::from).collect(),
            rejected: spec
                .rejected_methods()
                .iter()
                .map(|r| r.identifier.to_string())
                .collect(),
        }
    }
}

impl MetamodelSnapshot {
    /// Flatten a set of specifications, sorting by type name.
    #[must_use]
    pub fn from_specifications(specs: &[Arc<ObjectSpecification>]) -> Self {
        let mut specifications: Vec<CanonicalSpecification> = specs
            .iter()
            .map(|s| CanonicalSpecification::from(s.as_ref()))
            .collect();
        specifications.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        Self { specifications }
    }

    /// Find a specification by type name.
    #[must_use]
    pub fn specification(&self, type_name: &str) -> Option<&CanonicalSpecification> {
        self.specifications.iter().find(|s| s.type_name == type_name)
    }

    /// Number of members across all specifications.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.specifications.iter().map(|s| s.members.len()).sum()
    }
}

// =============================================================================
// CHECKSUM
// =============================================================================

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the encoded payload.
///
/// Detects accidental corruption only; use the `crypto-hash` feature for a
/// collision-resistant hash.
#[must_use]
pub fn payload_checksum(payload: &[u8]) -> u64 {
    payload.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

// =============================================================================
// EXPORT FUNCTIONS
// =============================================================================

/// Encode a snapshot in the canonical format.
pub fn encode_canonical(snapshot: &MetamodelSnapshot) -> Result<Vec<u8>, MetamodelError> {
    let payload = postcard::to_allocvec(snapshot)
        .map_err(|e| MetamodelError::SerializationError(format!("Data: {}", e)))?;
    let header = CanonicalHeader::new(
        snapshot.specifications.len() as u64,
        snapshot.member_count() as u64,
        payload_checksum(&payload),
    );
    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| MetamodelError::SerializationError(format!("Header: {}", e)))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Export specifications in the canonical format.
pub fn export_canonical(specs: &[Arc<ObjectSpecification>]) -> Result<Vec<u8>, MetamodelError> {
    encode_canonical(&MetamodelSnapshot::from_specifications(specs))
}

/// Decode and verify a canonical export.
pub fn decode_canonical(data: &[u8]) -> Result<MetamodelSnapshot, MetamodelError> {
    let Some((len_bytes, rest)) = data.split_first_chunk::<4>() else {
        return Err(MetamodelError::DeserializationError(
            "Data too short".to_string(),
        ));
    };
    let header_len = u32::from_le_bytes(*len_bytes) as usize;
    if rest.len() < header_len {
        return Err(MetamodelError::DeserializationError(
            "Data too short for header".to_string(),
        ));
    }
    let (header_bytes, payload) = rest.split_at(header_len);

    let header: CanonicalHeader = postcard::from_bytes(header_bytes)
        .map_err(|e| MetamodelError::DeserializationError(format!("Header: {}", e)))?;
    header.validate()?;

    if payload.len() > MAX_EXPORT_PAYLOAD_SIZE {
        return Err(MetamodelError::DeserializationError(format!(
            "Payload size {} exceeds maximum allowed {}",
            payload.len(),
            MAX_EXPORT_PAYLOAD_SIZE
        )));
    }

    let computed = payload_checksum(payload);
    if computed != header.checksum {
        return Err(MetamodelError::DeserializationError(format!(
            "Checksum mismatch: expected {}, got {}",
            header.checksum, computed
        )));
    }

    let snapshot: MetamodelSnapshot = postcard::from_bytes(payload)
        .map_err(|e| MetamodelError::DeserializationError(format!("Data: {}", e)))?;

    if snapshot.specifications.len() as u64 != header.specification_count
        || snapshot.member_count() as u64 != header.member_count
    {
        return Err(MetamodelError::DeserializationError(
            "Count mismatch".to_string(),
        ));
    }
    Ok(snapshot)
}

/// Check that `data` is a valid export of exactly these specifications.
pub fn verify_canonical(
    specs: &[Arc<ObjectSpecification>],
    data: &[u8],
) -> Result<bool, MetamodelError> {
    let imported = decode_canonical(data)?;
    Ok(imported == MetamodelSnapshot::from_specifications(specs))
}

/// Checksum of the canonical export of these specifications.
pub fn canonical_checksum(specs: &[Arc<ObjectSpecification>]) -> Result<u64, MetamodelError> {
    let payload = postcard::to_allocvec(&MetamodelSnapshot::from_specifications(specs))
        .map_err(|e| MetamodelError::SerializationError(e.to_string()))?;
    Ok(payload_checksum(&payload))
}

// =============================================================================
// CRYPTOGRAPHIC HASH SUPPORT
// =============================================================================

/// BLAKE3 hash (hex) of the canonical export of these specifications.
#[cfg(feature = "crypto-hash")]
pub fn canonical_crypto_hash(specs: &[Arc<ObjectSpecification>]) -> Result<String, MetamodelError> {
    let data = export_canonical(specs)?;
    Ok(compute_blake3_hash(&data))
}

/// BLAKE3 hash (hex) of raw bytes.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn compute_blake3_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReflectorConfig;
    use crate::loader::SpecificationLoader;
    use crate::reflect::{Annotation, ClassDescriptor, MethodDescriptor, TypeCatalog};
    use crate::TypeRef;

    fn specs() -> Vec<Arc<ObjectSpecification>> {
        let customer = ClassDescriptor::new("Customer")
            .with_annotation(Annotation::new("Entity"))
            .with_method(
                MethodDescriptor::new("getName", TypeRef::named("string"))
                    .with_annotation(Annotation::new("Property").with_text("named", "Full Name")),
            )
            .with_method(MethodDescriptor::new("getOrders", TypeRef::collection("list", "Order")));
        let catalog =
            TypeCatalog::from_descriptors([customer, ClassDescriptor::new("Order")]).expect("catalog");
        let loader = SpecificationLoader::new(catalog, ReflectorConfig::default());
        loader.load("Customer").expect("load");
        loader.all_specifications()
    }

    #[test]
    fn export_is_bit_stable() {
        let first = export_canonical(&specs()).expect("export");
        let second = export_canonical(&specs()).expect("export");
        assert_eq!(first, second);
    }

    #[test]
    fn decode_restores_snapshot() {
        let specs = specs();
        let data = export_canonical(&specs).expect("export");
        let snapshot = decode_canonical(&data).expect("decode");
        let customer = snapshot.specification("Customer").expect("customer");
        assert_eq!(customer.specialization, Some(Specialization::Entity));
        assert!(verify_canonical(&specs, &data).expect("verify"));
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let mut data = export_canonical(&specs()).expect("export");
        let last = data.len() - 1;
        data[last] ^= 0xff;
        assert!(decode_canonical(&data).is_err());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let header = CanonicalHeader {
            magic: *b"NOPE",
            ..CanonicalHeader::new(0, 0, 0)
        };
        assert!(header.validate().is_err());
        assert!(decode_canonical(&[1, 0]).is_err());
    }
}
