use loan_store::QueryResults;
use tracing::debug;

use crate::error::{ContractError, ContractResult};

/// Drain a result set into `[{"Key":"<k>","Record":<document>},...]`.
///
/// Keys are JSON-escaped. Record bytes are embedded verbatim, without being
/// parsed or validated. An empty result set yields exactly `[]`. The result
/// set is released whether this returns `Ok` or `Err`.
pub fn aggregate(results: QueryResults<'_>) -> ContractResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(64);
    buffer.push(b'[');

    let mut count = 0usize;
    for record in results {
        let record = record?;
        if count > 0 {
            buffer.push(b',');
        }
        buffer.extend_from_slice(br#"{"Key":"#);
        serde_json::to_writer(&mut buffer, &record.key)
            .map_err(|e| ContractError::Serialization(e.to_string()))?;
        buffer.extend_from_slice(br#","Record":"#);
        buffer.extend_from_slice(&record.value);
        buffer.push(b'}');
        count += 1;
    }

    buffer.push(b']');
    debug!(records = count, bytes = buffer.len(), "query results aggregated");
    Ok(buffer)
}
