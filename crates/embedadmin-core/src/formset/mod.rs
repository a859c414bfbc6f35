//! Reconciling formsets: one row form per existing item plus blank extra
//! rows, validated together and folded back into a plain collection.

mod factory;
mod management;

pub use factory::{FormsetArgs, FormsetOptions, FormsetType, formset_factory};
pub use management::{
    ConstructionError, INITIAL_FORMS, MAX_NUM_FORMS, ManagementData, TOTAL_FORMS,
};

use crate::{
    DELETION_FIELD_NAME, ORDERING_FIELD_NAME,
    error::InternalError,
    form::{FormArgs, FormData, FormField, FormView, RowForm, RowFormClass, is_checked},
    model::ModelDef,
    traits::Record,
    value::Value,
};
use std::{collections::BTreeMap, fmt::Display, sync::Arc};

// Rows built beyond the allowed maximum before the rest are ignored.
const ABSOLUTE_MAX_OVERFLOW: usize = 1000;

///
/// FormsetView
///
/// Object-safe read surface of any formset (embedded or related), used by
/// the controller to aggregate errors and by presentation adapters.
///

pub trait FormsetView {
    fn prefix(&self) -> &str;

    fn model(&self) -> &'static ModelDef;

    /// Resolved row fields, without the deletion and ordering inputs.
    fn base_fields(&self) -> &[FormField];

    fn form_views(&self) -> Vec<&dyn FormView>;

    fn initial_form_count(&self) -> usize;

    /// Unbound template row with the `__prefix__` placeholder index.
    fn empty_form_view(&self) -> &dyn FormView;

    fn management_data(&self) -> ManagementData;

    fn non_form_errors(&self) -> &[String];

    fn can_delete(&self) -> bool;

    fn can_order(&self) -> bool;

    fn is_bound(&self) -> bool;

    fn is_valid(&self) -> bool;
}

///
/// ChangeSummary
///
/// Audit view of one formset's save: display strings of added, changed and
/// deleted items. Feeds the change message.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeSummary {
    pub name: String,
    pub added: Vec<String>,
    pub changed: Vec<(String, Vec<String>)>,
    pub deleted: Vec<String>,
}

impl ChangeSummary {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

///
/// ReconciliationResult
///
/// `kept` is the new collection: surviving initial items then new items,
/// in form order. `changed` and `deleted` are audit-only.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReconciliationResult<R> {
    pub kept: Vec<R>,
    pub changed: Vec<(R, Vec<String>)>,
    pub deleted: Vec<R>,
    pub new: Vec<R>,
}

impl<R> ReconciliationResult<R> {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            kept: Vec::new(),
            changed: Vec::new(),
            deleted: Vec::new(),
            new: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

impl<R: Display> ReconciliationResult<R> {
    #[must_use]
    pub fn summary(&self, name: &str) -> ChangeSummary {
        ChangeSummary {
            name: name.to_string(),
            added: self.new.iter().map(ToString::to_string).collect(),
            changed: self
                .changed
                .iter()
                .map(|(item, fields)| (item.to_string(), fields.clone()))
                .collect(),
            deleted: self.deleted.iter().map(ToString::to_string).collect(),
        }
    }
}

impl<R> Default for ReconciliationResult<R> {
    fn default() -> Self {
        Self::empty()
    }
}

///
/// ReconcilingFormset
///

pub struct ReconcilingFormset<F: RowFormClass> {
    ty: FormsetType<F>,
    prefix: String,
    data: Option<Arc<FormData>>,
    forms: Vec<F::Form>,
    initial_count: usize,
    management: ManagementData,
    non_form_errors: Vec<String>,
    empty_form: F::Form,
}

impl<F: RowFormClass> ReconcilingFormset<F> {
    pub(crate) fn new(
        ty: FormsetType<F>,
        args: FormsetArgs<F::Item>,
    ) -> Result<Self, ConstructionError> {
        let prefix = args.prefix.unwrap_or_else(|| ty.default_prefix());
        let source = args.source;
        let mut non_form_errors = Vec::new();

        let (total, initial) = match &args.data {
            None => {
                let initial = source.len();
                let extra = ty.extra.min(ty.max_items.saturating_sub(initial));

                (initial + extra, initial)
            }
            Some(data) => {
                let submitted = ManagementData::from_data(data, &prefix, ty.max_items)?;
                let initial = if args.save_as_new {
                    0
                } else {
                    submitted.initial
                };
                if initial > source.len() {
                    return Err(ConstructionError::InitialExceedsSource {
                        prefix,
                        initial,
                        available: source.len(),
                    });
                }

                let limit = ty.max_items.max(initial);
                if submitted.total > limit {
                    non_form_errors.push(format!("Please submit {limit} or fewer forms."));
                }

                (
                    submitted.total.min(limit.saturating_add(ABSOLUTE_MAX_OVERFLOW)),
                    initial,
                )
            }
        };

        let fields = Self::row_fields(&ty);
        let mut source = source.into_iter();
        let forms = (0..total)
            .map(|index| {
                let mut row = FormArgs::new()
                    .prefixed(format!("{prefix}-{index}"))
                    .bound(args.data.clone());

                if index < initial {
                    if let Some(item) = source.next() {
                        row = row.with_instance(item);
                    }
                    if ty.can_order {
                        let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
                        row = row.with_initial(BTreeMap::from([(
                            ORDERING_FIELD_NAME.to_string(),
                            Value::Int(position),
                        )]));
                    }
                } else {
                    row = row.empty_permitted(true);
                }

                ty.form.build(fields.clone(), row)
            })
            .collect();

        let empty_form = ty.form.build(
            fields,
            FormArgs::new()
                .prefixed(format!("{prefix}-__prefix__"))
                .empty_permitted(true),
        );

        tracing::debug!(
            prefix = %prefix,
            model = F::Item::MODEL.name,
            initial,
            extra = total - initial,
            bound = args.data.is_some(),
            "formset constructed"
        );

        Ok(Self {
            management: ManagementData {
                total,
                initial,
                max_num: ty.max_items,
            },
            ty,
            prefix,
            data: args.data,
            forms,
            initial_count: initial,
            non_form_errors,
            empty_form,
        })
    }

    // Base fields plus the formset-owned deletion and ordering inputs.
    fn row_fields(ty: &FormsetType<F>) -> Vec<FormField> {
        let mut fields = ty.base_fields.to_vec();
        if ty.can_delete {
            fields.push(FormField::checkbox(DELETION_FIELD_NAME, "Delete"));
        }
        if ty.can_order {
            fields.push(FormField::integer(ORDERING_FIELD_NAME, "Order"));
        }

        fields
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn forms(&self) -> &[F::Form] {
        &self.forms
    }

    /// One form per existing item, in source order.
    #[must_use]
    pub fn initial_forms(&self) -> &[F::Form] {
        &self.forms[..self.initial_count]
    }

    #[must_use]
    pub fn extra_forms(&self) -> &[F::Form] {
        &self.forms[self.initial_count..]
    }

    #[must_use]
    pub const fn empty_form(&self) -> &F::Form {
        &self.empty_form
    }

    #[must_use]
    pub fn non_form_errors(&self) -> &[String] {
        &self.non_form_errors
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    /// Whether a row is flagged for deletion (only when deletion is allowed).
    #[must_use]
    pub fn should_delete(&self, form: &F::Form) -> bool {
        self.ty.can_delete && is_checked(form.raw_value(DELETION_FIELD_NAME))
    }

    /// Bound, no formset-level errors, and every row valid. Rows flagged
    /// for deletion are not validated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_bound()
            && self.non_form_errors.is_empty()
            && self
                .forms
                .iter()
                .all(|form| self.should_delete(form) || form.is_valid())
    }

    /// Fold the submitted rows into a new collection without persisting.
    ///
    /// An invalid formset reconciles to an empty result.
    pub fn reconcile(&self) -> Result<ReconciliationResult<F::Item>, InternalError> {
        if !self.is_valid() {
            tracing::debug!(prefix = %self.prefix, "formset invalid; nothing to reconcile");

            return Ok(ReconciliationResult::empty());
        }

        let mut result = ReconciliationResult::empty();

        for form in self.initial_forms() {
            if self.should_delete(form) {
                let item = form.instance().cloned().ok_or_else(|| {
                    InternalError::admin_internal(format!(
                        "initial form of '{}' has no instance",
                        self.prefix
                    ))
                })?;
                result.deleted.push(item);
                continue;
            }

            let item = form.save(false)?;
            let changed: Vec<String> = form
                .changed_data()
                .into_iter()
                .filter(|field| field != DELETION_FIELD_NAME && field != ORDERING_FIELD_NAME)
                .collect();
            if !changed.is_empty() {
                result.changed.push((item.clone(), changed));
            }
            result.kept.push(item);
        }

        for form in self.extra_forms() {
            if !form.has_changed() || self.should_delete(form) {
                continue;
            }

            let item = form.save(false)?;
            result.new.push(item.clone());
            result.kept.push(item);
        }

        tracing::debug!(
            prefix = %self.prefix,
            kept = result.kept.len(),
            changed = result.changed.len(),
            deleted = result.deleted.len(),
            new = result.new.len(),
            "formset reconciled"
        );

        Ok(result)
    }
}

impl<F: RowFormClass> FormsetView for ReconcilingFormset<F> {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn model(&self) -> &'static ModelDef {
        F::Item::MODEL
    }

    fn base_fields(&self) -> &[FormField] {
        self.ty.base_fields()
    }

    fn form_views(&self) -> Vec<&dyn FormView> {
        self.forms.iter().map(|form| form as &dyn FormView).collect()
    }

    fn initial_form_count(&self) -> usize {
        self.initial_count
    }

    fn empty_form_view(&self) -> &dyn FormView {
        &self.empty_form
    }

    fn management_data(&self) -> ManagementData {
        self.management
    }

    fn non_form_errors(&self) -> &[String] {
        &self.non_form_errors
    }

    fn can_delete(&self) -> bool {
        self.ty.can_delete
    }

    fn can_order(&self) -> bool {
        self.ty.can_order
    }

    fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    fn is_valid(&self) -> bool {
        Self::is_valid(self)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        form::ModelFormClass,
        test_support::{Address, Phone, address, phone, resubmit},
    };
    use proptest::prelude::*;

    fn phones(options: FormsetOptions) -> FormsetType<ModelFormClass<Phone>> {
        formset_factory(ModelFormClass::new(), options).expect("phone formset should build")
    }

    fn addresses() -> FormsetType<ModelFormClass<Address>> {
        formset_factory(ModelFormClass::new(), FormsetOptions::default())
            .expect("address formset should build")
    }

    fn edit(data: &mut FormData, key: &str, value: &str) {
        data.set(key, value);
    }

    #[test]
    fn unbound_counts_follow_source_and_extra() {
        let formset = phones(FormsetOptions {
            extra: 3,
            ..FormsetOptions::default()
        })
        .construct(FormsetArgs::new(vec![phone("home", "1"), phone("work", "2")]))
        .expect("unbound construction cannot fail");

        assert_eq!(formset.initial_forms().len(), 2);
        assert_eq!(formset.extra_forms().len(), 3);
        assert_eq!(formset.prefix(), "phone");
        assert!(!formset.is_valid());
        assert_eq!(formset.empty_form().prefix(), Some("phone-__prefix__"));
    }

    #[test]
    fn extra_rows_are_clamped_to_max_items_but_items_never_hidden() {
        let options = FormsetOptions {
            max_items: 2,
            extra: 3,
            ..FormsetOptions::default()
        };
        let one = phones(options.clone())
            .construct(FormsetArgs::new(vec![phone("home", "1")]))
            .expect("unbound construction cannot fail");
        assert_eq!(one.extra_forms().len(), 1);

        let source = vec![phone("home", "1"), phone("work", "2"), phone("mobile", "3")];
        let three = phones(options)
            .construct(FormsetArgs::new(source))
            .expect("unbound construction cannot fail");
        assert_eq!(three.initial_forms().len(), 3);
        assert!(three.extra_forms().is_empty());
    }

    #[test]
    fn scenario_edit_delete_and_blank_extra() {
        let source = vec![phone("home", "555-0001"), phone("work", "555-0002")];
        let ty = phones(FormsetOptions::default());
        let unbound = ty
            .construct(FormsetArgs::new(source.clone()))
            .expect("unbound construction cannot fail");

        let mut data = resubmit(&unbound);
        edit(&mut data, "phone-0-number", "555-0009");
        edit(&mut data, "phone-1-DELETE", "on");

        let formset = ty
            .construct(FormsetArgs::new(source).bound(Arc::new(data)))
            .expect("bound construction should succeed");
        assert!(formset.is_valid());

        let result = formset.reconcile().expect("valid formset should reconcile");
        assert_eq!(result.kept, [phone("home", "555-0009")]);
        assert_eq!(
            result.changed,
            [(phone("home", "555-0009"), vec!["number".to_string()])]
        );
        assert_eq!(result.deleted, [phone("work", "555-0002")]);
        assert!(result.new.is_empty());
    }

    #[test]
    fn scenario_new_row_from_extra_form() {
        let ty = addresses();
        let unbound = ty
            .construct(FormsetArgs::new(Vec::new()))
            .expect("unbound construction cannot fail");

        let mut data = resubmit(&unbound);
        edit(&mut data, "address-0-city", "Springfield");

        let formset = ty
            .construct(FormsetArgs::new(Vec::new()).bound(Arc::new(data)))
            .expect("bound construction should succeed");
        let result = formset.reconcile().expect("valid formset should reconcile");

        assert_eq!(result.kept, [address("Springfield")]);
        assert_eq!(result.new, [address("Springfield")]);
        assert!(result.changed.is_empty());
        assert!(result.deleted.is_empty());
    }

    #[test]
    fn delete_flagged_extra_row_is_ignored() {
        let ty = addresses();
        let unbound = ty
            .construct(FormsetArgs::new(Vec::new()))
            .expect("unbound construction cannot fail");

        let mut data = resubmit(&unbound);
        edit(&mut data, "address-0-city", "Springfield");
        edit(&mut data, "address-0-DELETE", "on");

        let formset = ty
            .construct(FormsetArgs::new(Vec::new()).bound(Arc::new(data)))
            .expect("bound construction should succeed");

        assert_eq!(formset.reconcile().expect("reconcile"), ReconciliationResult::empty());
    }

    #[test]
    fn invalid_formset_reconciles_to_empty() {
        let source = vec![phone("home", "555-0001")];
        let ty = phones(FormsetOptions::default());
        let unbound = ty
            .construct(FormsetArgs::new(source.clone()))
            .expect("unbound construction cannot fail");

        let mut data = resubmit(&unbound);
        edit(&mut data, "phone-0-number", "");

        let formset = ty
            .construct(FormsetArgs::new(source).bound(Arc::new(data)))
            .expect("bound construction should succeed");

        assert!(!formset.is_valid());
        assert_eq!(
            formset.initial_forms()[0].errors().field("number"),
            ["This field is required."]
        );
        assert!(formset.reconcile().expect("never raises").is_empty());
    }

    #[test]
    fn deletion_disabled_ignores_delete_flag() {
        let source = vec![phone("home", "555-0001")];
        let ty = phones(FormsetOptions {
            can_delete: false,
            ..FormsetOptions::default()
        });

        let mut data = resubmit(
            &ty.construct(FormsetArgs::new(source.clone()))
                .expect("unbound construction cannot fail"),
        );
        edit(&mut data, "phone-0-DELETE", "on");

        let formset = ty
            .construct(FormsetArgs::new(source.clone()).bound(Arc::new(data)))
            .expect("bound construction should succeed");
        let result = formset.reconcile().expect("valid formset should reconcile");

        assert_eq!(result.kept, source);
        assert!(result.deleted.is_empty());
    }

    #[test]
    fn too_many_submitted_rows_is_a_non_form_error() {
        let ty = phones(FormsetOptions {
            max_items: 1,
            ..FormsetOptions::default()
        });
        let data: FormData = [("phone-TOTAL_FORMS", "3"), ("phone-INITIAL_FORMS", "0")]
            .into_iter()
            .collect();

        let formset = ty
            .construct(FormsetArgs::new(Vec::new()).bound(Arc::new(data)))
            .expect("bound construction should succeed");

        assert_eq!(formset.non_form_errors(), ["Please submit 1 or fewer forms."]);
        assert!(!formset.is_valid());
    }

    #[test]
    fn submitted_initial_count_beyond_source_fails_construction() {
        let ty = phones(FormsetOptions::default());
        let data: FormData = [("phone-TOTAL_FORMS", "3"), ("phone-INITIAL_FORMS", "2")]
            .into_iter()
            .collect();

        let err = ty
            .construct(FormsetArgs::new(vec![phone("home", "1")]).bound(Arc::new(data)))
            .err()
            .expect("stale initial count should fail");

        assert!(matches!(err, ConstructionError::InitialExceedsSource { available: 1, .. }));
    }

    #[test]
    fn save_as_new_treats_every_row_as_extra() {
        let source = vec![phone("home", "555-0001"), phone("work", "555-0002")];
        let ty = phones(FormsetOptions::default());
        let mut data = resubmit(
            &ty.construct(FormsetArgs::new(source))
                .expect("unbound construction cannot fail"),
        );
        edit(&mut data, "phone-1-DELETE", "on");

        let formset = ty
            .construct(
                FormsetArgs::new(Vec::new())
                    .bound(Arc::new(data))
                    .save_as_new(true),
            )
            .expect("bound construction should succeed");
        let result = formset.reconcile().expect("valid formset should reconcile");

        assert!(formset.initial_forms().is_empty());
        assert_eq!(result.new, [phone("home", "555-0001")]);
        assert_eq!(result.kept, result.new);
    }

    #[test]
    fn ordering_inputs_number_initial_rows() {
        let ty = phones(FormsetOptions {
            can_order: true,
            ..FormsetOptions::default()
        });
        let formset = ty
            .construct(FormsetArgs::new(vec![phone("home", "1"), phone("work", "2")]))
            .expect("unbound construction cannot fail");

        assert_eq!(formset.initial_forms()[1].display_value(ORDERING_FIELD_NAME), "2");
        assert_eq!(formset.extra_forms()[0].display_value(ORDERING_FIELD_NAME), "");
    }

    #[test]
    fn summary_lists_display_strings() {
        let result = ReconciliationResult {
            kept: vec![phone("home", "1")],
            changed: vec![(phone("home", "1"), vec!["number".to_string()])],
            deleted: vec![phone("work", "2")],
            new: Vec::new(),
        };
        let summary = result.summary("phone");

        assert_eq!(summary.changed, [("1".to_string(), vec!["number".to_string()])]);
        assert_eq!(summary.deleted, ["2"]);
        assert!(!summary.is_empty());
    }

    fn phone_source() -> impl Strategy<Value = Vec<Phone>> {
        prop::collection::vec(
            (prop::sample::select(vec!["home", "work", "mobile"]), "[0-9]{1,12}"),
            0..6,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(label, number)| phone(label, &number))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn form_counts_match_source_and_extra(
            source in phone_source(),
            extra in 0usize..4,
        ) {
            let ty = phones(FormsetOptions { extra, max_items: 20, ..FormsetOptions::default() });
            let formset = ty.construct(FormsetArgs::new(source.clone())).expect("unbound");

            prop_assert_eq!(formset.initial_forms().len(), source.len());
            prop_assert_eq!(formset.extra_forms().len(), extra);
        }

        #[test]
        fn untouched_resubmission_reconciles_to_source(
            source in phone_source(),
            extra in 0usize..4,
        ) {
            let ty = phones(FormsetOptions { extra, max_items: 20, ..FormsetOptions::default() });
            let data = resubmit(&ty.construct(FormsetArgs::new(source.clone())).expect("unbound"));
            let formset = ty
                .construct(FormsetArgs::new(source.clone()).bound(Arc::new(data)))
                .expect("bound");
            let result = formset.reconcile().expect("reconcile");

            prop_assert_eq!(result.kept, source);
            prop_assert!(result.changed.is_empty());
            prop_assert!(result.new.is_empty());
            prop_assert!(result.deleted.is_empty());
        }
    }
}
