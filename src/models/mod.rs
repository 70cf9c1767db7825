pub mod activity;
pub mod distributor;
pub mod order;
pub mod product;
pub mod sale;
pub mod user;
pub mod warehouse;

// Re-export only the types we actually use
pub use activity::ActivityLog;
pub use distributor::{
    CreateDistributor, Distributor, DistributorStockView, OrderableProduct, UpdateDistributor,
};
pub use order::{
    ConfirmDeliveryRequest, DispatchRequest, DistributorOrderView, OrderLine, OrderStatus,
    OrderSummary, PlaceOrderRequest, WarehouseOrderView,
};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use sale::{
    CreateCustomerOrder, CustomerOrder, CustomerOrderItem, RecordSaleRequest, SaleHistoryRow,
    SaleItemRequest,
};
pub use user::{User, UserRole};
pub use warehouse::{CreateWarehouse, InventoryView, UpdateWarehouse, Warehouse};
