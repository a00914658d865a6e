//! Document model for the two-party co-signing flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which party of the document is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sender,
    Recipient,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Recipient => "recipient",
        }
    }

    /// The opposite party.
    #[must_use]
    pub fn counterpart(&self) -> Role {
        match self {
            Role::Sender => Role::Recipient,
            Role::Recipient => Role::Sender,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sender" => Ok(Role::Sender),
            "recipient" => Ok(Role::Recipient),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document lifecycle status.
///
/// Monotonic: `pending` ranks below the two paid states, which rank
/// below `signed`. The paid states share a rank — recording the second
/// party's payment replaces the marker without regressing the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    SenderPaid,
    RecipientPaid,
    Signed,
}

impl DocumentStatus {
    /// Position in the forward-only ordering.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            DocumentStatus::Pending => 0,
            DocumentStatus::SenderPaid | DocumentStatus::RecipientPaid => 1,
            DocumentStatus::Signed => 2,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::SenderPaid => "sender_paid",
            DocumentStatus::RecipientPaid => "recipient_paid",
            DocumentStatus::Signed => "signed",
        }
    }

    /// The status marking this role's payment.
    #[must_use]
    pub fn paid_for(role: Role) -> DocumentStatus {
        match role {
            Role::Sender => DocumentStatus::SenderPaid,
            Role::Recipient => DocumentStatus::RecipientPaid,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document entity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub sender_email: String,
    pub recipient_email: String,
    /// Set exactly once by the identity-recording path; never overwritten.
    pub sender_verified_name: Option<String>,
    pub recipient_verified_name: Option<String>,
    pub status: DocumentStatus,
    /// Single-winner finalization claim flag. Flipped by a conditional
    /// update so the finalizer runs at most once per document.
    pub finalize_claimed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new document record.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub file_name: String,
    pub sender_email: String,
    pub recipient_email: String,
}

impl Document {
    /// Verified name recorded for a role, if any.
    #[must_use]
    pub fn verified_name(&self, role: Role) -> Option<&str> {
        match role {
            Role::Sender => self.sender_verified_name.as_deref(),
            Role::Recipient => self.recipient_verified_name.as_deref(),
        }
    }

    /// Contact address of a role.
    #[must_use]
    pub fn email(&self, role: Role) -> &str {
        match role {
            Role::Sender => &self.sender_email,
            Role::Recipient => &self.recipient_email,
        }
    }

    /// Both identity proofs recorded?
    #[must_use]
    pub fn both_identities_recorded(&self) -> bool {
        self.sender_verified_name.is_some() && self.recipient_verified_name.is_some()
    }

    /// Storage path of the document bytes.
    #[must_use]
    pub fn storage_path(&self) -> String {
        format!("{}/{}", self.id, self.file_name)
    }

    /// Insert a new document record.
    pub async fn create(pool: &sqlx::PgPool, input: CreateDocument) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO documents (id, file_name, sender_email, recipient_email, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(&input.file_name)
        .bind(&input.sender_email)
        .bind(&input.recipient_email)
        .fetch_one(pool)
        .await
    }

    /// Find a document by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Idempotently record a role's verified name. `COALESCE` keeps the
    /// first value; duplicate callbacks are no-ops.
    pub async fn set_verified_name_if_unset(
        pool: &sqlx::PgPool,
        id: Uuid,
        role: Role,
        verified_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = match role {
            Role::Sender => {
                r"
                UPDATE documents
                SET sender_verified_name = COALESCE(sender_verified_name, $2),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "
            }
            Role::Recipient => {
                r"
                UPDATE documents
                SET recipient_verified_name = COALESCE(recipient_verified_name, $2),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "
            }
        };
        sqlx::query_as(query)
            .bind(id)
            .bind(verified_name)
            .fetch_optional(pool)
            .await
    }

    /// Claim finalization for this document. The conditional update
    /// succeeds for exactly one caller: both names must be present and
    /// the claim flag unset.
    pub async fn claim_finalization(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET finalize_claimed = TRUE, updated_at = NOW()
            WHERE id = $1
              AND finalize_claimed = FALSE
              AND sender_verified_name IS NOT NULL
              AND recipient_verified_name IS NOT NULL
            ",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Terminal transition to `signed`. Idempotent: re-running against
    /// an already signed document changes nothing.
    pub async fn mark_signed(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query(
            r"
            UPDATE documents
            SET status = 'signed', updated_at = NOW()
            WHERE id = $1 AND status <> 'signed'
            ",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Self::find_by_id(pool, id).await
    }

    /// Record a party's payment. Never regresses a signed document.
    pub async fn record_payment(
        pool: &sqlx::PgPool,
        id: Uuid,
        role: Role,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query(
            r"
            UPDATE documents
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'signed'
            ",
        )
        .bind(id)
        .bind(DocumentStatus::paid_for(role))
        .execute(pool)
        .await?;
        Self::find_by_id(pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering_is_forward_only() {
        assert!(DocumentStatus::Pending.rank() < DocumentStatus::SenderPaid.rank());
        assert_eq!(
            DocumentStatus::SenderPaid.rank(),
            DocumentStatus::RecipientPaid.rank()
        );
        assert!(DocumentStatus::RecipientPaid.rank() < DocumentStatus::Signed.rank());
    }

    #[test]
    fn role_parses_and_prints() {
        assert_eq!("sender".parse::<Role>().unwrap(), Role::Sender);
        assert_eq!("recipient".parse::<Role>().unwrap(), Role::Recipient);
        assert!("notary".parse::<Role>().is_err());
        assert_eq!(Role::Sender.counterpart(), Role::Recipient);
        assert_eq!(Role::Recipient.to_string(), "recipient");
    }

    #[test]
    fn role_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Sender).unwrap(), "\"sender\"");
        let role: Role = serde_json::from_str("\"recipient\"").unwrap();
        assert_eq!(role, Role::Recipient);
    }
}
