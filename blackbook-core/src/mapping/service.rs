use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::entity::Entity;
use crate::error::{BlackbookError, BlackbookResult, short_type_name};
use crate::mapping::{
    BusinessObject, Hydrated, Mapper, MapperRegistry, MappingError, MappingResult, Property,
    PropertyType, Site, Slot, Value, ValueKind,
};
use crate::repository::{Referrer, Repository};

/// Maps between entity `E` and business object `B` and persists through
/// an injected repository.
pub struct BusinessService<E, B> {
    repository: Arc<dyn Repository<E>>,
    mappers: MapperRegistry,
    referrers: Vec<Arc<dyn Referrer>>,
    _bo: PhantomData<fn() -> B>,
}

impl<E, B> Clone for BusinessService<E, B> {
    fn clone(&self) -> Self {
        BusinessService {
            repository: Arc::clone(&self.repository),
            mappers: self.mappers.clone(),
            referrers: self.referrers.clone(),
            _bo: PhantomData,
        }
    }
}

/// The entity field `name`, `name + "Id"` or `name + "Ids"`, in that order.
fn matching_field<'a>(fields: &'a [Property], name: &str) -> Option<&'a Property> {
    let candidates = [name.to_string(), format!("{name}Id"), format!("{name}Ids")];
    candidates
        .iter()
        .find_map(|candidate| fields.iter().find(|field| field.name == candidate.as_str()))
}

fn is_value_of(ty: &PropertyType, kind: ValueKind) -> bool {
    matches!(ty, PropertyType::Value(field) if field.kind == kind)
}

impl<E: Entity, B: BusinessObject> BusinessService<E, B> {
    pub fn new(repository: Arc<dyn Repository<E>>, mappers: MapperRegistry) -> Self {
        BusinessService {
            repository,
            mappers,
            referrers: Vec::new(),
            _bo: PhantomData,
        }
    }

    /// Refuse to delete records that `referrer` still points at.
    pub fn referenced_by(mut self, referrer: Arc<dyn Referrer>) -> Self {
        self.referrers.push(referrer);
        self
    }

    pub fn create_bo(&self) -> B {
        B::default()
    }

    pub fn to_do(&self, bo: &B) -> MappingResult<E> {
        let fields = E::fields();
        let mut entity = E::default();

        for property in B::properties().iter().filter(|p| p.is_mapped()) {
            let bo_site = Site::of::<B>(property.name);
            let field = matching_field(&fields, property.name).ok_or_else(|| {
                MappingError::NoMatchingProperty {
                    site: bo_site.clone(),
                    target: short_type_name::<E>(),
                }
            })?;
            let do_site = Site::of::<E>(field.name);
            if !field.is_writable() {
                return Err(MappingError::NotWritable(do_site));
            }

            let slot = bo.read(property.name).ok_or_else(|| bo_site.unknown())?;
            let value = match (&property.ty, &field.ty, slot) {
                (PropertyType::Reference { .. }, to, Slot::Reference(id))
                    if is_value_of(to, ValueKind::Text) =>
                {
                    Value::from(id)
                }
                (PropertyType::ReferenceSet { .. }, to, Slot::References(ids))
                    if is_value_of(to, ValueKind::TextSet) =>
                {
                    Value::from(ids)
                }
                (PropertyType::Value(from), PropertyType::Value(to), Slot::Value(value))
                    if to.accepts(from) =>
                {
                    value
                }
                _ => {
                    return Err(MappingError::Unmappable {
                        from: bo_site,
                        to: do_site,
                    });
                }
            };
            entity.set(field.name, value)?;
        }

        Ok(entity)
    }

    pub fn to_bo(&self, entity: &E) -> BlackbookResult<B> {
        let fields = E::fields();
        let mut bo = B::default();

        for property in B::properties().iter().filter(|p| p.is_mapped()) {
            let bo_site = Site::of::<B>(property.name);
            let field = matching_field(&fields, property.name).ok_or_else(|| {
                MappingError::NoMatchingProperty {
                    site: bo_site.clone(),
                    target: short_type_name::<E>(),
                }
            })?;
            let do_site = Site::of::<E>(field.name);
            if !property.is_writable() {
                return Err(MappingError::NotWritable(bo_site).into());
            }

            let value = entity.get(field.name).ok_or_else(|| do_site.unknown())?;
            let hydrated = match (&property.ty, &field.ty) {
                (PropertyType::Reference { target, .. }, from)
                    if is_value_of(from, ValueKind::Text) =>
                {
                    match value {
                        Value::Null => Hydrated::Reference(None),
                        Value::Text(id) => {
                            let resolved = self.mappers.resolve_one(target, &id).ok_or_else(|| {
                                MappingError::NoMapper {
                                    site: bo_site.clone(),
                                    target: target.name(),
                                }
                            })??;
                            Hydrated::Reference(Some(resolved))
                        }
                        _ => return Err(do_site.mismatch().into()),
                    }
                }
                (PropertyType::ReferenceSet { target, .. }, from)
                    if is_value_of(from, ValueKind::TextSet) =>
                {
                    match value {
                        Value::Null => Hydrated::References(None),
                        Value::TextSet(ids) => {
                            let resolved =
                                self.mappers.resolve_many(target, &ids).ok_or_else(|| {
                                    MappingError::NoMapper {
                                        site: bo_site.clone(),
                                        target: target.name(),
                                    }
                                })??;
                            Hydrated::References(Some(resolved))
                        }
                        _ => return Err(do_site.mismatch().into()),
                    }
                }
                (PropertyType::Value(to), PropertyType::Value(from)) if to.accepts(from) => {
                    Hydrated::Value(value)
                }
                _ => {
                    return Err(MappingError::Unmappable {
                        from: do_site,
                        to: bo_site,
                    }
                    .into());
                }
            };
            bo.write(property.name, hydrated)?;
        }

        Ok(bo)
    }

    fn to_bos(&self, entities: Vec<E>) -> BlackbookResult<Vec<B>> {
        entities.iter().map(|entity| self.to_bo(entity)).collect()
    }

    pub fn find_all(&self) -> BlackbookResult<Vec<B>> {
        self.to_bos(self.repository.find_all()?)
    }

    pub fn find(&self, id: &str) -> BlackbookResult<Option<B>> {
        self.repository
            .find_by_id(id)?
            .map(|entity| self.to_bo(&entity))
            .transpose()
    }

    pub fn find_many(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<B>> {
        self.to_bos(self.repository.find_by_id_in(ids)?)
    }

    fn mapped(&self, bo: &B) -> BlackbookResult<E> {
        Ok(self.to_do(bo).inspect_err(|e| {
            warn!(bo = short_type_name::<B>(), id = bo.id(), error = %e, "cannot map for saving");
        })?)
    }

    /// Persist `bo` without reading it back. Used when references of
    /// `bo` are not stored yet and could not be hydrated.
    pub fn store(&self, bo: &B) -> BlackbookResult<E> {
        let entity = self.mapped(bo)?;
        self.repository.save(entity)
    }

    /// Persist `bo` and hand back what storage now holds for it.
    ///
    /// Nothing is written unless the record can be read back, so a
    /// dangling reference never reaches the repository.
    pub fn save(&self, bo: &B) -> BlackbookResult<B> {
        let entity = self.mapped(bo)?;
        self.to_bo(&entity).inspect_err(|e| {
            warn!(bo = short_type_name::<B>(), id = bo.id(), error = %e, "cannot read back, not saving");
        })?;
        let stored = self.repository.save(entity)?;
        self.to_bo(&stored)
    }

    /// Fails with `InUse` while another record still refers to `bo`.
    pub fn delete(&self, bo: &B) -> BlackbookResult<()> {
        for referrer in &self.referrers {
            if let Some(by) = referrer.referring_to(bo.id())? {
                warn!(bo = short_type_name::<B>(), id = bo.id(), by = %by, "refusing to delete");
                return Err(BlackbookError::InUse {
                    kind: short_type_name::<B>(),
                    id: bo.id().to_string(),
                    by,
                });
            }
        }
        self.repository.delete_by_id(bo.id())
    }
}

impl<E: Entity, B: BusinessObject> Mapper<B> for BusinessService<E, B> {
    fn map_single(&self, id: &str) -> BlackbookResult<B> {
        self.find(id)?
            .ok_or_else(|| BlackbookError::not_found::<B>(id))
    }

    /// Fails on the first id that has no stored record.
    fn map_multiple(&self, ids: &BTreeSet<String>) -> BlackbookResult<Vec<B>> {
        let found = self.find_many(ids)?;
        if let Some(missing) = ids
            .iter()
            .find(|id| !found.iter().any(|bo| bo.id() == id.as_str()))
        {
            return Err(BlackbookError::not_found::<B>(missing));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::entity::random_id;
    use crate::mapping::MapperFn;
    use crate::repository::{FieldReferrer, InMemoryRepository};

    macro_rules! bo_identity {
        ($ty:ident) => {
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    format!("{self:?}") == format!("{other:?}")
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        };
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct BasicDo {
        id: String,
        bla1: String,
    }

    impl Default for BasicDo {
        fn default() -> Self {
            BasicDo { id: random_id(), bla1: String::new() }
        }
    }

    impl Entity for BasicDo {
        fn id(&self) -> &str {
            &self.id
        }

        fn fields() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla1", ValueKind::Text),
            ]
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.clone().into()),
                "bla1" => Some(self.bla1.clone().into()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
            let site = Site::of::<Self>(field);
            match field {
                "id" => self.id = value.cast(&site)?,
                "bla1" => self.bla1 = value.cast(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone)]
    struct BasicBo {
        id: String,
        bla1: String,
    }

    bo_identity!(BasicBo);

    fn basic(id: &str, bla1: &str) -> BasicBo {
        BasicBo { id: id.into(), bla1: bla1.into() }
    }

    impl Default for BasicBo {
        fn default() -> Self {
            basic(&random_id(), "")
        }
    }

    impl BusinessObject for BasicBo {
        fn id(&self) -> &str {
            &self.id
        }

        fn properties() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla1", ValueKind::Text),
            ]
        }

        fn read(&self, property: &str) -> Option<Slot> {
            match property {
                "id" => Some(Slot::value(self.id.clone())),
                "bla1" => Some(Slot::value(self.bla1.clone())),
                _ => None,
            }
        }

        fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
            let site = Site::of::<Self>(property);
            match property {
                "id" => self.id = value.value(&site)?,
                "bla1" => self.bla1 = value.value(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct NestedDo {
        id: String,
        bla2: String,
        nested_id: Option<String>,
        nested_ids: BTreeSet<String>,
    }

    impl Default for NestedDo {
        fn default() -> Self {
            NestedDo {
                id: random_id(),
                bla2: String::new(),
                nested_id: None,
                nested_ids: BTreeSet::new(),
            }
        }
    }

    impl Entity for NestedDo {
        fn id(&self) -> &str {
            &self.id
        }

        fn fields() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla2", ValueKind::Text),
                Property::optional("nestedId", ValueKind::Text),
                Property::required("setIds", ValueKind::TextSet),
            ]
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.clone().into()),
                "bla2" => Some(self.bla2.clone().into()),
                "nestedId" => Some(self.nested_id.clone().into()),
                "setIds" => Some(self.nested_ids.clone().into()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
            let site = Site::of::<Self>(field);
            match field {
                "id" => self.id = value.cast(&site)?,
                "bla2" => self.bla2 = value.cast(&site)?,
                "nestedId" => self.nested_id = value.cast(&site)?,
                "setIds" => self.nested_ids = value.cast(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    /// `nested` is declared twice: once through the type parameter of a
    /// generic base, once concretely.
    #[derive(Debug, Clone)]
    struct NestedBo {
        id: String,
        bla2: String,
        nested: Option<BasicBo>,
        set: HashSet<BasicBo>,
        scratch: String,
    }

    bo_identity!(NestedBo);

    impl Default for NestedBo {
        fn default() -> Self {
            NestedBo {
                id: random_id(),
                bla2: String::new(),
                nested: None,
                set: HashSet::new(),
                scratch: String::new(),
            }
        }
    }

    impl BusinessObject for NestedBo {
        fn id(&self) -> &str {
            &self.id
        }

        fn properties() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla2", ValueKind::Text),
                Property::type_parameter("nested"),
                Property::reference::<BasicBo>("nested", true),
                Property::reference_set::<BasicBo>("set", false),
                Property::required("scratch", ValueKind::Text).ignored(),
            ]
        }

        fn read(&self, property: &str) -> Option<Slot> {
            match property {
                "id" => Some(Slot::value(self.id.clone())),
                "bla2" => Some(Slot::value(self.bla2.clone())),
                "nested" => Some(Slot::reference(self.nested.as_ref())),
                "set" => Some(Slot::references(Some(&self.set))),
                _ => None,
            }
        }

        fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
            let site = Site::of::<Self>(property);
            match property {
                "id" => self.id = value.value(&site)?,
                "bla2" => self.bla2 = value.value(&site)?,
                "nested" => self.nested = value.reference(&site)?,
                "set" => self.set = value.references(&site)?.unwrap_or_default(),
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    fn basic_service() -> BusinessService<BasicDo, BasicBo> {
        BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new())
    }

    fn resolving(id: &str) -> BlackbookResult<BasicBo> {
        Ok(match id {
            "4711" => basic(id, "blubbs"),
            "4712" => basic(id, "muh"),
            _ => basic(id, "das wollen wir nicht"),
        })
    }

    fn nested_service() -> BusinessService<NestedDo, NestedBo> {
        let mappers = MapperRegistry::new().with::<BasicBo, _>(Arc::new(MapperFn(resolving)));
        BusinessService::new(Arc::new(InMemoryRepository::new()), mappers)
    }

    #[test]
    fn test_basic_bo_to_do() {
        let bo = basic(&random_id(), "blaaaa");
        let entity = basic_service().to_do(&bo).unwrap();
        assert_eq!(entity, BasicDo { id: bo.id.clone(), bla1: "blaaaa".into() });
    }

    #[test]
    fn test_basic_do_to_bo() {
        let entity = BasicDo { id: random_id(), bla1: "blaaa".into() };
        let bo = basic_service().to_bo(&entity).unwrap();
        assert_eq!(bo, basic(&entity.id, "blaaa"));
    }

    #[test]
    fn test_references_map_to_ids() {
        let nested1 = basic("n1", "muh1");
        let nested2 = basic("n2", "muh2");
        let bo = NestedBo {
            bla2: "blubb".into(),
            nested: Some(nested1.clone()),
            set: HashSet::from([nested1, nested2]),
            ..NestedBo::default()
        };

        let entity = nested_service().to_do(&bo).unwrap();
        assert_eq!(entity.nested_id.as_deref(), Some("n1"));
        assert_eq!(entity.nested_ids, BTreeSet::from(["n1".to_string(), "n2".to_string()]));
        assert_eq!(entity.bla2, "blubb");
    }

    #[test]
    fn test_null_reference_maps_to_null_id() {
        let entity = nested_service().to_do(&NestedBo::default()).unwrap();
        assert_eq!(entity.nested_id, None);
    }

    #[test]
    fn test_references_are_resolved_through_mapper() {
        let entity = NestedDo {
            bla2: "bla".into(),
            nested_id: Some("4711".into()),
            nested_ids: BTreeSet::from(["4711".to_string(), "4712".to_string()]),
            ..NestedDo::default()
        };

        let bo = nested_service().to_bo(&entity).unwrap();
        assert_eq!(bo.nested, Some(basic("4711", "blubbs")));
        assert_eq!(bo.set, HashSet::from([basic("4711", "blubbs"), basic("4712", "muh")]));
    }

    #[test]
    fn test_missing_mapper_fails() {
        let service: BusinessService<NestedDo, NestedBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());
        let entity = NestedDo { nested_id: Some("4711".into()), ..NestedDo::default() };

        let err = service.to_bo(&entity).unwrap_err();
        assert!(matches!(
            err,
            BlackbookError::Mapping(MappingError::NoMapper { target: "BasicBo", .. })
        ));
    }

    #[test]
    fn test_ignored_property_keeps_its_default() {
        let service = nested_service();
        let bo = NestedBo { scratch: "scribbles".into(), ..NestedBo::default() };

        let entity = service.to_do(&bo).unwrap();
        let back = service.to_bo(&entity).unwrap();
        assert_eq!(back.scratch, "");
        assert_eq!(back.id, bo.id);
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct ImmutableDo {
        id: String,
        bla: String,
    }

    impl Entity for ImmutableDo {
        fn id(&self) -> &str {
            &self.id
        }

        fn fields() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla", ValueKind::Text).read_only(),
            ]
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.clone().into()),
                "bla" => Some(self.bla.clone().into()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
            let site = Site::of::<Self>(field);
            match field {
                "id" => self.id = value.cast(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct ImmutableBo {
        id: String,
        bla: String,
    }

    impl BusinessObject for ImmutableBo {
        fn id(&self) -> &str {
            &self.id
        }

        fn properties() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla", ValueKind::Text),
            ]
        }

        fn read(&self, property: &str) -> Option<Slot> {
            match property {
                "id" => Some(Slot::value(self.id.clone())),
                "bla" => Some(Slot::value(self.bla.clone())),
                _ => None,
            }
        }

        fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
            let site = Site::of::<Self>(property);
            match property {
                "id" => self.id = value.value(&site)?,
                "bla" => self.bla = value.value(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    #[test]
    fn test_unwritable_property_fails() {
        let service: BusinessService<ImmutableDo, ImmutableBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());
        let bo = ImmutableBo { id: "1".into(), bla: "bla".into() };

        assert_eq!(
            service.to_do(&bo).unwrap_err(),
            MappingError::NotWritable(Site::of::<ImmutableDo>("bla"))
        );
    }

    #[test]
    fn test_property_without_counterpart_fails() {
        let service: BusinessService<BasicDo, ImmutableBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());
        let bo = ImmutableBo { id: "1".into(), bla: "bla".into() };

        assert!(matches!(
            service.to_do(&bo).unwrap_err(),
            MappingError::NoMatchingProperty { target: "BasicDo", .. }
        ));
    }

    #[test]
    fn test_save_round_trips_through_repository() {
        let service = basic_service();
        let saved = service.save(&basic("42", "stored")).unwrap();

        assert_eq!(saved, basic("42", "stored"));
        assert_eq!(service.find("42").unwrap(), Some(saved.clone()));
        assert_eq!(service.map_single("42").unwrap(), saved);

        service.delete(&saved).unwrap();
        assert!(service.find_all().unwrap().is_empty());
        assert!(matches!(
            service.map_single("42").unwrap_err(),
            BlackbookError::NotFound { kind: "BasicBo", .. }
        ));
    }

    /// Entity whose reference columns have the wrong shape for `NestedBo`.
    macro_rules! misshapen_do {
        ($ty:ident, nested: $nested:ident, set: $set:ident) => {
            #[derive(Debug, Clone, Default, Serialize, Deserialize)]
            struct $ty {
                id: String,
                bla2: String,
            }

            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn fields() -> Vec<Property> {
                    vec![
                        Property::required("id", ValueKind::Text),
                        Property::required("bla2", ValueKind::Text),
                        Property::optional("nestedId", ValueKind::$nested),
                        Property::optional("setIds", ValueKind::$set),
                    ]
                }

                fn get(&self, field: &str) -> Option<Value> {
                    match field {
                        "id" => Some(self.id.clone().into()),
                        "bla2" => Some(self.bla2.clone().into()),
                        "nestedId" | "setIds" => Some(Value::Null),
                        _ => None,
                    }
                }

                fn set(&mut self, field: &str, value: Value) -> MappingResult<()> {
                    let site = Site::of::<Self>(field);
                    match field {
                        "id" => self.id = value.cast(&site)?,
                        "bla2" => self.bla2 = value.cast(&site)?,
                        "nestedId" | "setIds" => {}
                        _ => return Err(site.unknown()),
                    }
                    Ok(())
                }
            }
        };
    }

    misshapen_do!(SetAsTextDo, nested: Text, set: Text);
    misshapen_do!(ReferenceAsSetDo, nested: TextSet, set: TextSet);

    #[test]
    fn test_reference_set_needs_a_set_of_ids() {
        let service: BusinessService<SetAsTextDo, NestedBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());

        assert_eq!(
            service.to_do(&NestedBo::default()).unwrap_err(),
            MappingError::Unmappable {
                from: Site::of::<NestedBo>("set"),
                to: Site::of::<SetAsTextDo>("setIds"),
            }
        );

        let entity = SetAsTextDo { id: "1".into(), bla2: "bla".into() };
        assert!(matches!(
            service.to_bo(&entity).unwrap_err(),
            BlackbookError::Mapping(MappingError::Unmappable { .. })
        ));
    }

    #[test]
    fn test_reference_needs_a_single_id() {
        let service: BusinessService<ReferenceAsSetDo, NestedBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());

        assert_eq!(
            service.to_do(&NestedBo::default()).unwrap_err(),
            MappingError::Unmappable {
                from: Site::of::<NestedBo>("nested"),
                to: Site::of::<ReferenceAsSetDo>("nestedId"),
            }
        );
    }

    #[derive(Debug, Clone, Default)]
    struct ReadOnlyBo {
        id: String,
        bla1: String,
    }

    impl BusinessObject for ReadOnlyBo {
        fn id(&self) -> &str {
            &self.id
        }

        fn properties() -> Vec<Property> {
            vec![
                Property::required("id", ValueKind::Text),
                Property::required("bla1", ValueKind::Text).read_only(),
            ]
        }

        fn read(&self, property: &str) -> Option<Slot> {
            match property {
                "id" => Some(Slot::value(self.id.clone())),
                "bla1" => Some(Slot::value(self.bla1.clone())),
                _ => None,
            }
        }

        fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
            let site = Site::of::<Self>(property);
            match property {
                "id" => self.id = value.value(&site)?,
                _ => return Err(site.unknown()),
            }
            Ok(())
        }
    }

    #[test]
    fn test_read_only_property_cannot_be_hydrated() {
        let service: BusinessService<BasicDo, ReadOnlyBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), MapperRegistry::new());
        let bo = ReadOnlyBo { id: "1".into(), bla1: "bla".into() };

        let entity = service.to_do(&bo).unwrap();
        assert_eq!(entity.bla1, "bla");
        assert!(matches!(
            service.to_bo(&entity).unwrap_err(),
            BlackbookError::Mapping(MappingError::NotWritable(site)) if site == Site::of::<ReadOnlyBo>("bla1")
        ));
    }

    fn only_4711(id: &str) -> BlackbookResult<BasicBo> {
        match id {
            "4711" => Ok(basic(id, "blubbs")),
            _ => Err(BlackbookError::not_found::<BasicBo>(id)),
        }
    }

    #[test]
    fn test_save_that_cannot_be_read_back_stores_nothing() {
        let mappers = MapperRegistry::new().with::<BasicBo, _>(Arc::new(MapperFn(only_4711)));
        let service: BusinessService<NestedDo, NestedBo> =
            BusinessService::new(Arc::new(InMemoryRepository::new()), mappers);

        let dangling = NestedBo { nested: Some(basic("4712", "never stored")), ..NestedBo::default() };
        assert!(matches!(
            service.save(&dangling).unwrap_err(),
            BlackbookError::NotFound { kind: "BasicBo", .. }
        ));
        assert!(service.find_all().unwrap().is_empty());

        let resolvable = NestedBo { nested: Some(basic("4711", "blubbs")), ..NestedBo::default() };
        service.save(&resolvable).unwrap();
        assert_eq!(service.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_refuses_referenced_records() {
        let nested_rows = Arc::new(InMemoryRepository::<NestedDo>::new());
        let referrer = FieldReferrer::new(nested_rows.clone() as Arc<dyn Repository<NestedDo>>, "nestedId");
        let basics = Arc::new(basic_service().referenced_by(Arc::new(referrer)));
        let nested: BusinessService<NestedDo, NestedBo> = BusinessService::new(
            nested_rows,
            MapperRegistry::new().with::<BasicBo, _>(Arc::clone(&basics)),
        );

        let target = basics.save(&basic("4711", "blubbs")).unwrap();
        let holder = nested
            .save(&NestedBo { nested: Some(target.clone()), ..NestedBo::default() })
            .unwrap();

        assert!(matches!(
            basics.delete(&target).unwrap_err(),
            BlackbookError::InUse { kind: "BasicBo", .. }
        ));
        assert_eq!(nested.find_all().unwrap(), vec![holder.clone()]);

        nested.delete(&holder).unwrap();
        basics.delete(&target).unwrap();
        assert!(basics.find_all().unwrap().is_empty());
    }
}
