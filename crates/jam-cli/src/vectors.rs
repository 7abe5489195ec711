// Path: crates/jam-cli/src/vectors.rs

//! JSON test-vector schema and its conversion into the engine's native
//! types. Kept as its own DTO layer rather than deriving `serde` on
//! `jam-types` directly: `ServiceAccount::storage` and `preimage_lookup`
//! key on `Vec<u8>` and `(Hash32, u64)`, neither of which `serde_json` can
//! represent as object keys, so the wire shape has to flatten those into
//! arrays of pairs.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use jam_state::{AccumulationContext, DeltaSnapshot};
use jam_types::{
    AuthorizerQueue, ExecResult, Hash32, PackageSpec, PreimageStatus, Privileges, ProtocolParams,
    ServiceAccount, ServiceId, Slot, TimeInfo, ValidatorKey, ValidatorKeys, WorkContext,
    WorkReport, WorkResult, VALIDATOR_RECORD_SIZE,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct VectorFile {
    #[serde(default)]
    pub params: Option<VectorParams>,
    pub time_slot: Slot,
    #[serde(default)]
    pub entropy: Option<String>,
    pub accounts: Vec<VectorAccount>,
    #[serde(default)]
    pub privileges: VectorPrivileges,
    #[serde(default)]
    pub validator_keys: Vec<String>,
    #[serde(default)]
    pub authorizer_queue: Vec<Vec<String>>,
    pub reports: Vec<VectorReport>,
}

#[derive(Deserialize)]
pub struct VectorParams {
    pub core_count: Option<u32>,
    pub validators_count: Option<u32>,
    pub epoch_length: Option<u32>,
    pub total_gas_alloc_accumulation: Option<u64>,
    pub gas_alloc_accumulation: Option<u64>,
    pub parallel_threshold: Option<usize>,
}

#[derive(Deserialize)]
pub struct VectorAccount {
    pub id: ServiceId,
    pub code_hash: String,
    pub balance: u64,
    #[serde(default)]
    pub min_gas_accumulate: u64,
    #[serde(default)]
    pub min_gas_on_transfer: u64,
    #[serde(default)]
    pub storage: Vec<VectorStorageEntry>,
    #[serde(default)]
    pub preimages: Vec<VectorPreimageEntry>,
}

#[derive(Deserialize)]
pub struct VectorStorageEntry {
    pub key: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct VectorPreimageEntry {
    pub hash: String,
    pub size: u64,
    /// Lifecycle timeslots: `[]` requested, `[t0]` available, `[t0,t1]`
    /// forgotten, `[t0,t1,t2]` re-solicited. See `PreimageStatus`.
    pub status: Vec<Slot>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct VectorPrivileges {
    #[serde(default)]
    pub manager: ServiceId,
    #[serde(default)]
    pub registrar: ServiceId,
    #[serde(default)]
    pub designate: ServiceId,
    #[serde(default)]
    pub assign: Vec<ServiceId>,
    #[serde(default)]
    pub always_accumulate: BTreeMap<ServiceId, u64>,
}

#[derive(Deserialize)]
pub struct VectorReport {
    pub package_hash: String,
    #[serde(default)]
    pub core_index: u32,
    pub results: Vec<VectorResult>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Deserialize)]
pub struct VectorResult {
    pub service_id: ServiceId,
    pub code_hash: String,
    pub payload_hash: String,
    pub accumulate_gas: u64,
    #[serde(default)]
    pub fault: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

fn parse_hash(field: &str, s: &str) -> Result<Hash32> {
    let bytes = hex::decode(s.trim_start_matches("0x")).with_context(|| format!("{field}: invalid hex"))?;
    if bytes.len() != 32 {
        bail!("{field}: expected 32 bytes, got {}", bytes.len());
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn parse_bytes(field: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim_start_matches("0x")).with_context(|| format!("{field}: invalid hex"))
}

impl VectorParams {
    fn apply(&self, mut base: ProtocolParams) -> ProtocolParams {
        if let Some(v) = self.core_count {
            base.core_count = v;
        }
        if let Some(v) = self.validators_count {
            base.validators_count = v;
        }
        if let Some(v) = self.epoch_length {
            base.epoch_length = v;
        }
        if let Some(v) = self.total_gas_alloc_accumulation {
            base.total_gas_alloc_accumulation = v;
        }
        if let Some(v) = self.gas_alloc_accumulation {
            base.gas_alloc_accumulation = v;
        }
        if let Some(v) = self.parallel_threshold {
            base.parallel_threshold = v;
        }
        base
    }
}

/// The fully parsed inputs needed to drive one `execute_accumulation` call.
pub struct ParsedVector {
    pub params: ProtocolParams,
    pub context: AccumulationContext,
    pub reports: Vec<WorkReport>,
}

pub fn parse_vector(raw: &str) -> Result<ParsedVector> {
    let file: VectorFile = serde_json::from_str(raw).context("parsing test vector JSON")?;

    let params = file.params.as_ref().map(|p| p.apply(ProtocolParams::default())).unwrap_or_default();

    let mut accounts: BTreeMap<ServiceId, ServiceAccount> = BTreeMap::new();
    for a in &file.accounts {
        let mut account = ServiceAccount::new(parse_hash("account.code_hash", &a.code_hash)?, 0, 0);
        account.balance = a.balance;
        account.min_gas_accumulate = a.min_gas_accumulate;
        account.min_gas_on_transfer = a.min_gas_on_transfer;
        for entry in &a.storage {
            account
                .storage
                .insert(parse_bytes("storage.key", &entry.key)?, parse_bytes("storage.value", &entry.value)?);
        }
        for entry in &a.preimages {
            let hash = parse_hash("preimage.hash", &entry.hash)?;
            account
                .preimage_lookup
                .insert((hash, entry.size), PreimageStatus(entry.status.clone()));
            if let Some(data) = &entry.data {
                account.preimages.insert(hash, parse_bytes("preimage.data", data)?);
            }
        }
        accounts.insert(a.id, account);
    }

    let mut privileges = Privileges::new(params.core_count as usize);
    privileges.manager = file.privileges.manager;
    privileges.registrar = file.privileges.registrar;
    privileges.designate = file.privileges.designate;
    if !file.privileges.assign.is_empty() {
        privileges.assign = file.privileges.assign.clone();
    }
    privileges.always_accumulate = file.privileges.always_accumulate.clone();

    let validator_keys: ValidatorKeys = file
        .validator_keys
        .iter()
        .map(|s| {
            let bytes = parse_bytes("validator_keys[]", s)?;
            ValidatorKey::from_bytes(&bytes)
                .with_context(|| format!("validator key must be {VALIDATOR_RECORD_SIZE} bytes"))
        })
        .collect::<Result<_>>()?;

    let mut authorizer_queue = AuthorizerQueue::new(params.core_count as usize);
    for (core, hashes) in file.authorizer_queue.iter().enumerate() {
        if let Some(slot) = authorizer_queue.cores.get_mut(core) {
            *slot = hashes
                .iter()
                .map(|s| parse_hash("authorizer_queue[][]", s))
                .collect::<Result<_>>()?;
        }
    }

    let entropy = match &file.entropy {
        Some(s) => parse_hash("entropy", s)?,
        None => [0u8; 32],
    };

    let context = AccumulationContext::new(
        DeltaSnapshot::new(accounts),
        validator_keys,
        authorizer_queue,
        privileges,
        TimeInfo::new(file.time_slot),
        entropy,
    );

    let reports = file
        .reports
        .iter()
        .map(|r| -> Result<WorkReport> {
            let results = r
                .results
                .iter()
                .map(|res| -> Result<WorkResult> {
                    let exec_result = match (&res.fault, &res.output) {
                        (Some(msg), _) => ExecResult::Fault(msg.clone()),
                        (None, Some(out)) => ExecResult::Ok(parse_bytes("result.output", out)?),
                        (None, None) => ExecResult::Ok(Vec::new()),
                    };
                    Ok(WorkResult {
                        service_id: res.service_id,
                        code_hash: parse_hash("result.code_hash", &res.code_hash)?,
                        payload_hash: parse_hash("result.payload_hash", &res.payload_hash)?,
                        accumulate_gas: res.accumulate_gas,
                        exec_result,
                    })
                })
                .collect::<Result<_>>()?;
            Ok(WorkReport {
                package_spec: PackageSpec {
                    hash: parse_hash("report.package_hash", &r.package_hash)?,
                },
                core_index: r.core_index,
                results,
                context: WorkContext {
                    prerequisites: r
                        .prerequisites
                        .iter()
                        .map(|s| parse_hash("report.prerequisites[]", s))
                        .collect::<Result<_>>()?,
                },
            })
        })
        .collect::<Result<_>>()?;

    Ok(ParsedVector { params, context, reports })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    {
        "time_slot": 100,
        "accounts": [
            {
                "id": 0,
                "code_hash": "0000000000000000000000000000000000000000000000000000000000000000",
                "balance": 1000000
            }
        ],
        "reports": [
            {
                "package_hash": "0101010101010101010101010101010101010101010101010101010101010101",
                "results": [
                    {
                        "service_id": 0,
                        "code_hash": "0000000000000000000000000000000000000000000000000000000000000000",
                        "payload_hash": "0202020202020202020202020202020202020202020202020202020202020202",
                        "accumulate_gas": 5000
                    }
                ]
            }
        ]
    }
    "#;

    #[test]
    fn rejects_hash_of_the_wrong_length() {
        let bad = SAMPLE.replacen("\"0000000000000000000000000000000000000000000000000000000000000000\"", "\"00\"", 1);
        let Err(err) = parse_vector(&bad) else {
            panic!("expected a parse error for a truncated hash");
        };
        assert!(err.to_string().contains("expected 32 bytes"));
    }

    #[test]
    fn parses_a_well_formed_vector() {
        let parsed = parse_vector(SAMPLE).unwrap();
        assert_eq!(parsed.reports.len(), 1);
        assert_eq!(parsed.reports[0].results[0].service_id, 0);
        assert_eq!(
            parsed.context.service_accounts.get_read_only(0).unwrap().balance,
            1_000_000
        );
    }
}
