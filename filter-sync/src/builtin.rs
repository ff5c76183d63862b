//! The console's built-in list routes and their filter configurations.
//!
//! Hosts supply the option providers for fields backed by other entities
//! (courses, instructors, students, classes) and may register additional
//! routes on the returned builder before freezing the registry.

use std::sync::Arc;

use crmdesk_filter_model::fields::FilterFieldDescriptor;
use crmdesk_filter_model::fields::LIMIT;
use crmdesk_filter_model::fields::NumberBounds;
use crmdesk_filter_model::fields::OptionProvider;
use crmdesk_filter_model::fields::PAGE;
use crmdesk_filter_model::fields::SORT_BY;
use crmdesk_filter_model::fields::SORT_ORDER;
use crmdesk_filter_model::fields::SelectOption;
use crmdesk_filter_model::value::FilterValue;

use crate::error::RegistryError;
use crate::registry::FilterRegistry;
use crate::registry::RegistryBuilder;
use crate::registry::RouteConfigBuilder;

/// Option providers the built-in routes depend on.
#[derive(Clone)]
pub struct BuiltinProviders {
    pub courses: Arc<dyn OptionProvider>,
    pub instructors: Arc<dyn OptionProvider>,
    pub students: Arc<dyn OptionProvider>,
    pub classes: Arc<dyn OptionProvider>,
}

pub fn builtin_registry(providers: &BuiltinProviders) -> Result<FilterRegistry, RegistryError> {
    builtin_routes(providers).build()
}

/// The standard console routes as a builder, so hosts can append their own
/// routes before calling `build()`.
pub fn builtin_routes(providers: &BuiltinProviders) -> RegistryBuilder {
    RegistryBuilder::new()
        .route(students_route(providers))
        .route(courses_route(providers))
        .route(classes_route(providers))
        .route(orders_route(providers))
        .route(payments_route(providers))
}

fn list_defaults(builder: RouteConfigBuilder, sort_by: &str) -> RouteConfigBuilder {
    builder
        .default_value(PAGE, FilterValue::Number(1.0))
        .default_value(LIMIT, FilterValue::Number(10.0))
        .default_value(SORT_BY, FilterValue::text(sort_by))
        .default_value(SORT_ORDER, FilterValue::choice("asc"))
}

fn students_route(providers: &BuiltinProviders) -> RouteConfigBuilder {
    list_defaults(RouteConfigBuilder::new("students"), "name")
        .field(FilterFieldDescriptor::select_static(
            "status",
            "Status",
            vec![
                SelectOption::new("active", "Active"),
                SelectOption::new("paused", "Paused"),
                SelectOption::new("archived", "Archived"),
            ],
        ))
        .field(FilterFieldDescriptor::date_range("joined", "Joined"))
        .field(FilterFieldDescriptor::select_provider(
            "courseId",
            "Course",
            providers.courses.clone(),
        ))
        .field(FilterFieldDescriptor::select_provider(
            "classId",
            "Class",
            providers.classes.clone(),
        ))
}

fn courses_route(providers: &BuiltinProviders) -> RouteConfigBuilder {
    list_defaults(RouteConfigBuilder::new("courses"), "title")
        .field(FilterFieldDescriptor::select_static(
            "level",
            "Level",
            vec![
                SelectOption::new("beginner", "Beginner"),
                SelectOption::new("intermediate", "Intermediate"),
                SelectOption::new("advanced", "Advanced"),
            ],
        ))
        .field(FilterFieldDescriptor::boolean("published", "Published"))
        .field(FilterFieldDescriptor::select_provider(
            "instructorId",
            "Instructor",
            providers.instructors.clone(),
        ))
}

fn classes_route(providers: &BuiltinProviders) -> RouteConfigBuilder {
    list_defaults(RouteConfigBuilder::new("classes"), "startsAt")
        .field(FilterFieldDescriptor::multi_select_static(
            "weekday",
            "Weekday",
            vec![
                SelectOption::new("mon", "Monday"),
                SelectOption::new("tue", "Tuesday"),
                SelectOption::new("wed", "Wednesday"),
                SelectOption::new("thu", "Thursday"),
                SelectOption::new("fri", "Friday"),
                SelectOption::new("sat", "Saturday"),
                SelectOption::new("sun", "Sunday"),
            ],
        ))
        .field(FilterFieldDescriptor::boolean("active", "Active"))
        .field(FilterFieldDescriptor::select_provider(
            "courseId",
            "Course",
            providers.courses.clone(),
        ))
        .field(FilterFieldDescriptor::select_provider(
            "instructorId",
            "Instructor",
            providers.instructors.clone(),
        ))
}

fn orders_route(providers: &BuiltinProviders) -> RouteConfigBuilder {
    list_defaults(RouteConfigBuilder::new("orders"), "createdAt")
        .default_value(SORT_ORDER, FilterValue::choice("desc"))
        .field(FilterFieldDescriptor::select_static(
            "status",
            "Status",
            vec![
                SelectOption::new("pending", "Pending"),
                SelectOption::new("paid", "Paid"),
                SelectOption::new("cancelled", "Cancelled"),
            ],
        ))
        .field(FilterFieldDescriptor::date_range("created", "Created"))
        .field(FilterFieldDescriptor::number(
            "minTotal",
            "Minimum total",
            NumberBounds::at_least(0.0),
        ))
        .field(FilterFieldDescriptor::select_provider(
            "studentId",
            "Student",
            providers.students.clone(),
        ))
}

fn payments_route(providers: &BuiltinProviders) -> RouteConfigBuilder {
    list_defaults(RouteConfigBuilder::new("payments"), "paidAt")
        .default_value(SORT_ORDER, FilterValue::choice("desc"))
        .field(FilterFieldDescriptor::select_static(
            "method",
            "Method",
            vec![
                SelectOption::new("cash", "Cash"),
                SelectOption::new("card", "Card"),
                SelectOption::new("transfer", "Bank transfer"),
            ],
        ))
        .field(FilterFieldDescriptor::select_static(
            "status",
            "Status",
            vec![
                SelectOption::new("settled", "Settled"),
                SelectOption::new("refunded", "Refunded"),
                SelectOption::new("failed", "Failed"),
            ],
        ))
        .field(FilterFieldDescriptor::date_range("paid", "Paid"))
        .field(FilterFieldDescriptor::select_provider(
            "studentId",
            "Student",
            providers.students.clone(),
        ))
}
