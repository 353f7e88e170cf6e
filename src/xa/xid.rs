//! Global transaction branch identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::xa::error::{XaError, XaResult};

/// Identifies one branch of a global transaction.
///
/// Compared and hashed by value. A `Xid` is only ever used as a key; it never
/// owns anything beyond its own bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Xid {
    format_id: i32,
    global_transaction_id: Vec<u8>,
    branch_qualifier: Vec<u8>,
}

impl Xid {
    /// Maximum length of the global transaction id.
    pub const MAXGTRIDSIZE: usize = 64;
    /// Maximum length of the branch qualifier.
    pub const MAXBQUALSIZE: usize = 64;

    pub fn new(
        format_id: i32,
        global_transaction_id: impl Into<Vec<u8>>,
        branch_qualifier: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            format_id,
            global_transaction_id: global_transaction_id.into(),
            branch_qualifier: branch_qualifier.into(),
        }
    }

    /// Generate a fresh Xid with format id 0 and a ULID as the global id.
    pub fn generate() -> Self {
        Self::new(0, Ulid::new().to_bytes().to_vec(), Vec::new())
    }

    /// A new branch of the same global transaction.
    pub fn branch(&self, branch_qualifier: impl Into<Vec<u8>>) -> Self {
        Self::new(
            self.format_id,
            self.global_transaction_id.clone(),
            branch_qualifier,
        )
    }

    /// Check the component sizes against the XA limits.
    pub fn validate(&self) -> XaResult<()> {
        if self.global_transaction_id.len() > Self::MAXGTRIDSIZE {
            return Err(XaError::Inval(format!(
                "global transaction id is {} bytes, limit is {}",
                self.global_transaction_id.len(),
                Self::MAXGTRIDSIZE
            )));
        }
        if self.branch_qualifier.len() > Self::MAXBQUALSIZE {
            return Err(XaError::Inval(format!(
                "branch qualifier is {} bytes, limit is {}",
                self.branch_qualifier.len(),
                Self::MAXBQUALSIZE
            )));
        }
        Ok(())
    }

    pub fn format_id(&self) -> i32 {
        self.format_id
    }

    pub fn global_transaction_id(&self) -> &[u8] {
        &self.global_transaction_id
    }

    pub fn branch_qualifier(&self) -> &[u8] {
        &self.branch_qualifier
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.format_id)?;
        write_hex(f, &self.global_transaction_id)?;
        write!(f, ":")?;
        write_hex(f, &self.branch_qualifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_by_value() {
        let a = Xid::new(1, b"gtrid".to_vec(), b"b1".to_vec());
        let b = Xid::new(1, b"gtrid".to_vec(), b"b1".to_vec());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        assert_ne!(b, b.branch(b"b2".to_vec()));
    }

    #[test]
    fn test_display() {
        let xid = Xid::new(7, vec![0xab, 0x01], vec![0xff]);
        assert_eq!(xid.to_string(), "7:ab01:ff");
    }

    #[test]
    fn test_validate_limits() {
        assert!(Xid::generate().validate().is_ok());

        let long = Xid::new(0, vec![0u8; Xid::MAXGTRIDSIZE + 1], Vec::new());
        assert!(matches!(long.validate(), Err(XaError::Inval(_))));

        let long = Xid::new(0, Vec::new(), vec![0u8; Xid::MAXBQUALSIZE + 1]);
        assert!(matches!(long.validate(), Err(XaError::Inval(_))));
    }

    #[test]
    fn test_generate_unique() {
        assert_ne!(Xid::generate(), Xid::generate());
    }

    #[test]
    fn test_serde() {
        let xid = Xid::new(3, b"g".to_vec(), b"q".to_vec());
        let json = serde_json::to_string(&xid).unwrap();
        let back: Xid = serde_json::from_str(&json).unwrap();
        assert_eq!(xid, back);
    }
}
