//! Embedded template sources.
//!
//! Templates live under the repo-level `templates/` directory and are
//! compiled into the binary so the tool runs standalone. The extraction
//! command writes them back out for customization.

/// `(relative path, source)` pairs for every embedded template
pub const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("common/entity.j2", include_str!("../../templates/common/entity.j2")),
    (
        "common/repository.j2",
        include_str!("../../templates/common/repository.j2"),
    ),
    ("common/manager.j2", include_str!("../../templates/common/manager.j2")),
    (
        "common/constants.j2",
        include_str!("../../templates/common/constants.j2"),
    ),
    ("common/eto.j2", include_str!("../../templates/common/eto.j2")),
    (
        "common/eto_types.j2",
        include_str!("../../templates/common/eto_types.j2"),
    ),
    ("common/seeder.j2", include_str!("../../templates/common/seeder.j2")),
    ("common/dto.j2", include_str!("../../templates/common/dto.j2")),
    (
        "common/app_service_interface.j2",
        include_str!("../../templates/common/app_service_interface.j2"),
    ),
    (
        "common/app_service.j2",
        include_str!("../../templates/common/app_service.j2"),
    ),
    (
        "common/validator.j2",
        include_str!("../../templates/common/validator.j2"),
    ),
    (
        "common/mapper_profile.j2",
        include_str!("../../templates/common/mapper_profile.j2"),
    ),
    (
        "common/controller.j2",
        include_str!("../../templates/common/controller.j2"),
    ),
    (
        "common/permissions.j2",
        include_str!("../../templates/common/permissions.j2"),
    ),
    (
        "common/permission_provider.j2",
        include_str!("../../templates/common/permission_provider.j2"),
    ),
    (
        "common/efcore_config.j2",
        include_str!("../../templates/common/efcore_config.j2"),
    ),
    (
        "common/efcore_repository.j2",
        include_str!("../../templates/common/efcore_repository.j2"),
    ),
    (
        "common/mongodb_repository.j2",
        include_str!("../../templates/common/mongodb_repository.j2"),
    ),
    ("common/enum.j2", include_str!("../../templates/common/enum.j2")),
    (
        "common/enum_extensions.j2",
        include_str!("../../templates/common/enum_extensions.j2"),
    ),
    (
        "common/value_object.j2",
        include_str!("../../templates/common/value_object.j2"),
    ),
    (
        "common/value_object_factory.j2",
        include_str!("../../templates/common/value_object_factory.j2"),
    ),
    (
        "common/domain_event.j2",
        include_str!("../../templates/common/domain_event.j2"),
    ),
    (
        "common/event_handler.j2",
        include_str!("../../templates/common/event_handler.j2"),
    ),
    (
        "common/custom_repository_interface.j2",
        include_str!("../../templates/common/custom_repository_interface.j2"),
    ),
    (
        "common/custom_repository_efcore.j2",
        include_str!("../../templates/common/custom_repository_efcore.j2"),
    ),
    (
        "common/integration_test.j2",
        include_str!("../../templates/common/integration_test.j2"),
    ),
];

/// Look up an embedded template by relative path
pub fn embedded(path: &str) -> Option<&'static str> {
    EMBEDDED_TEMPLATES
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, source)| *source)
}
