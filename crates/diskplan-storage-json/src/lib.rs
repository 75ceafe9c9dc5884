use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use diskplan_core::{sort_by_order_date, validate_purchase, CoreError, PurchaseLedger};
use diskplan_domain::PurchaseRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const TMP_SUFFIX: &str = "tmp";
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of the purchase ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default = "current_version")]
    version: u32,
    #[serde(default)]
    purchases: Vec<PurchaseRecord>,
}

fn current_version() -> u32 {
    FORMAT_VERSION
}

/// Purchase ledger persisted as a single JSON document.
///
/// Every mutation rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written ledger behind. A missing
/// file reads as an empty ledger.
#[derive(Debug, Clone)]
pub struct JsonPurchaseLedger {
    path: PathBuf,
}

impl JsonPurchaseLedger {
    pub fn new(path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LedgerDocument, CoreError> {
        if !self.path.exists() {
            return Ok(LedgerDocument {
                version: FORMAT_VERSION,
                purchases: Vec::new(),
            });
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(LedgerDocument::default());
        }
        let document: LedgerDocument =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        if document.version > FORMAT_VERSION {
            return Err(CoreError::Storage(format!(
                "ledger `{}` uses format version {}, newest supported is {}",
                self.path.display(),
                document.version,
                FORMAT_VERSION
            )));
        }
        Ok(document)
    }

    fn store(&self, purchases: Vec<PurchaseRecord>) -> Result<(), CoreError> {
        let document = LedgerDocument {
            version: FORMAT_VERSION,
            purchases,
        };
        let data = serde_json::to_string_pretty(&document)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PurchaseLedger for JsonPurchaseLedger {
    fn append(
        &mut self,
        product: &str,
        quantity: u32,
        unit_price: f64,
        order_date: NaiveDate,
    ) -> Result<PurchaseRecord, CoreError> {
        validate_purchase(product, quantity, unit_price)?;
        let mut document = self.load()?;
        let record = PurchaseRecord::new(product, quantity, unit_price, order_date);
        document.purchases.push(record.clone());
        self.store(document.purchases)?;
        debug!(
            path = %self.path.display(),
            product,
            quantity,
            unit_price,
            %order_date,
            "appended purchase"
        );
        Ok(record)
    }

    fn read_all(&self) -> Result<Vec<PurchaseRecord>, CoreError> {
        let mut purchases = self.load()?.purchases;
        sort_by_order_date(&mut purchases);
        Ok(purchases)
    }

    fn clear(&mut self) -> Result<(), CoreError> {
        self.store(Vec::new())?;
        info!(path = %self.path.display(), "cleared purchase ledger");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/purchases.json")),
            PathBuf::from("/data/purchases.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/data/ledger")), PathBuf::from("/data/ledger.tmp"));
    }
}
