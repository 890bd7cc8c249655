// 领域模块 - 用于组织应用的业务逻辑
//
// 按业务领域分组，包含2个领域：分类、导出

pub mod catalog;
pub mod export;

pub use catalog::{CatalogDomain, CatalogError};
pub use export::ExportDomain;
