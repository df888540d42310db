//! Generation schema: model types, loading and validation.
//!
//! The schema is the ground truth the renderers work from. It is created at
//! load time, mutated only by [`Schema::validate`] (which fills defaults),
//! and then frozen for the rest of the run.

mod load;
mod model;
mod validator;

pub use load::{load_schema, save_schema};
pub use model::{
    CustomRepository, DbProvider, DomainEvent, Entity, EntityKind, EnumDef, EnumValue,
    LocalizationMerge, ManyToManyRelation, ManyToOneRelation, MethodParameter, MultiTenancy,
    OneToManyRelation, OneToOneRelation, Options, PrimaryKeyType, Property, Relations,
    RepositoryMethod, Schema, Solution, TargetFramework, ValueObjectConfig,
};
