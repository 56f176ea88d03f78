//! Issue an invoice against an in-memory authority.
//!
//! Run with: `RUST_LOG=afip_factura=debug cargo run --example issue_invoice`

use std::sync::atomic::{AtomicU64, Ordering};

use afip_factura::core::*;
use afip_factura::wsfe::*;
use async_trait::async_trait;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

/// Stands in for the WSFE web service: numbers from 41 and approves everything.
struct SandboxAuthority {
    last: AtomicU64,
}

#[async_trait]
impl VoucherService for SandboxAuthority {
    async fn last_voucher_number(&self, _: u32, _: VoucherType) -> Result<u64, AuthorityError> {
        Ok(self.last.load(Ordering::SeqCst))
    }

    async fn submit_voucher(
        &self,
        payload: &WireInvoicePayload,
        _return_full: bool,
    ) -> Result<AuthorityReply, AuthorityError> {
        self.last.store(payload.voucher_number_from, Ordering::SeqCst);
        Ok(AuthorityReply {
            cae: Some("74123456789012".into()),
            cae_expiry: Some("20261029".into()),
            result: Some("A".into()),
            voucher_number: Some(payload.voucher_number_from),
            ..AuthorityReply::default()
        })
    }

    async fn voucher_info(
        &self,
        _: u64,
        _: u32,
        _: VoucherType,
    ) -> Result<Option<VoucherRecord>, AuthorityError> {
        Ok(None)
    }

    async fn voucher_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError> {
        Ok(Vec::new())
    }

    async fn document_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError> {
        Ok(Vec::new())
    }

    async fn aliquot_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError> {
        Ok(Vec::new())
    }

    async fn sales_points(&self) -> Result<Vec<SalesPointInfo>, AuthorityError> {
        Ok(Vec::new())
    }

    async fn server_status(&self) -> Result<ServerStatus, AuthorityError> {
        Ok(ServerStatus {
            app_server: "OK".into(),
            db_server: "OK".into(),
            auth_server: "OK".into(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,afip_factura=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let invoicer = Invoicer::from_env(SandboxAuthority {
        last: AtomicU64::new(41),
    })?;

    let request = InvoiceRequestBuilder::new(
        VoucherType::InvoiceB,
        Concept::Products,
        Customer::final_consumer(),
    )
    .add_item(LineItem::new("Producto 1", dec!(2), dec!(100), VatAliquot::TwentyOne))
    .add_item(LineItem::new("Producto 2", dec!(1), dec!(50), VatAliquot::TwentyOne))
    .build()?;

    let outcome = invoicer.issue(&request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    // A credit note must reference the voucher it corrects.
    let credit_note = InvoiceRequestBuilder::new(
        VoucherType::CreditNoteB,
        Concept::Products,
        Customer::final_consumer(),
    )
    .add_item(LineItem::new("Devolución", dec!(1), dec!(50), VatAliquot::TwentyOne))
    .build()?;

    match invoicer.issue(&credit_note).await {
        Ok(outcome) => println!("unexpected approval: {}", outcome.authorization.code),
        Err(err) => println!("rejected at {:?}: {err}", err.stage()),
    }

    Ok(())
}
