pub mod entities;
pub mod error;
pub mod records;

pub use entities::{
    CanonicalName, MappingRow, NtpEntity, Product, ProductIngredient, ProductStatus,
    SENTINEL_MOIETY, SET_DELIMITER, SubstanceSets, TmEntity, join_set_key,
};
pub use error::{CcddError, Result};
pub use records::{
    CorrectionRecord, DoseFormMapRecord, DrugRecord, FormRecord, IngredientRecord,
    MoietyXrefRecord, RankedUsageRecord, RouteRecord, StatusRecord,
};
