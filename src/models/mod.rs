pub mod amount;
pub mod document;
pub mod documents;
pub mod grn;

pub use document::{DocumentBody, DocumentKind, StoredDocument};
pub use documents::{
    DeliveryItem, DeliveryNote, Invoice, LineItem, Party, PurchaseOrder, Receipt, Settlement,
    SettlementKind, SettlementLine,
};
pub use grn::{GoodsReceivedNote, ReceivedItem, ReceivingCost};
