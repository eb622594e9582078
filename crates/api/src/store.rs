//! Site widget instance store.
//!
//! Every placement mutation is validated here, against the site's template
//! positions and the widget catalog, before anything reaches the database.
//! The repositories then apply order changes atomically.

use edusite_core::error::{CoreError, PlacementError};
use edusite_core::placement::{self, check_placement};
use edusite_core::render::{self, RenderAudience, RenderMode};
use edusite_core::types::DbId;
use edusite_core::widget_config;
use edusite_db::models::site::Site;
use edusite_db::models::site_widget::{
    CreateSiteWidget, MoveSiteWidget, RenderedSiteWidget, SiteWidget, UpdateSiteWidget,
};
use edusite_db::models::widget_definition::WidgetDefinition;
use edusite_db::models::widget_position::WidgetPosition;
use edusite_db::repositories::{
    SiteRepo, SiteWidgetRepo, WidgetDefinitionRepo, WidgetPositionRepo,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Validating front of [`SiteWidgetRepo`].
pub struct SiteWidgetStore;

impl SiteWidgetStore {
    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Load a site, or `NotFound`.
    pub async fn site(pool: &PgPool, site_id: DbId) -> AppResult<Site> {
        SiteRepo::find_by_id(pool, site_id).await?.ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Site",
                id: site_id,
            })
        })
    }

    /// Load a position of `template_id`, or `UnknownPosition`.
    pub async fn position(
        pool: &PgPool,
        template_id: DbId,
        slug: &str,
    ) -> AppResult<WidgetPosition> {
        WidgetPositionRepo::find(pool, template_id, slug)
            .await?
            .ok_or_else(|| {
                AppError::from(PlacementError::UnknownPosition {
                    template_id,
                    slug: slug.to_string(),
                })
            })
    }

    /// Load a catalog definition, active or not, or `UnknownWidget`.
    pub async fn definition(pool: &PgPool, slug: &str) -> AppResult<WidgetDefinition> {
        WidgetDefinitionRepo::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| {
                AppError::from(PlacementError::UnknownWidget {
                    slug: slug.to_string(),
                })
            })
    }

    /// Load an instance owned by `site_id`, or `InstanceNotFound`.
    pub async fn instance(pool: &PgPool, site_id: DbId, id: DbId) -> AppResult<SiteWidget> {
        SiteWidgetRepo::find_for_site(pool, site_id, id)
            .await?
            .ok_or_else(|| AppError::from(PlacementError::InstanceNotFound { id }))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Place a catalog widget at the end of a position.
    ///
    /// Checks, in order: the position exists in the site's template, the
    /// widget exists, the position allows it, the widget is active and
    /// permitted for the site type, the config matches the widget's schema.
    pub async fn create(
        pool: &PgPool,
        site_id: DbId,
        input: &CreateSiteWidget,
    ) -> AppResult<SiteWidget> {
        let site = Self::site(pool, site_id).await?;
        let position = Self::position(pool, site.template_id, &input.position_slug).await?;
        let definition = Self::definition(pool, &input.widget_slug).await?;
        check_placement(&definition, &position, &site.site_type)?;

        let empty = Value::Object(Map::new());
        let config =
            widget_config::normalize(&definition.slug, input.config.as_ref().unwrap_or(&empty))?;

        let widget =
            SiteWidgetRepo::create(pool, site.id, &definition.slug, &position.slug, &config)
                .await?;
        Ok(widget)
    }

    /// Move an instance to `order` within `position_slug`, re-validating the
    /// destination.
    pub async fn move_instance(
        pool: &PgPool,
        site_id: DbId,
        instance_id: DbId,
        input: &MoveSiteWidget,
    ) -> AppResult<SiteWidget> {
        let site = Self::site(pool, site_id).await?;
        let instance = Self::instance(pool, site.id, instance_id).await?;
        let position = Self::position(pool, site.template_id, &input.position_slug).await?;
        let definition = Self::definition(pool, &instance.widget_slug).await?;
        check_placement(&definition, &position, &site.site_type)?;

        SiteWidgetRepo::move_to(pool, site.id, instance.id, &position.slug, input.order)
            .await?
            .ok_or_else(|| AppError::from(PlacementError::InstanceNotFound { id: instance_id }))
    }

    /// Merge a config patch and toggle flags.
    ///
    /// The merged config must satisfy the widget's schema; on failure nothing
    /// is written. Position and order are never changed.
    pub async fn update(
        pool: &PgPool,
        site_id: DbId,
        instance_id: DbId,
        input: &UpdateSiteWidget,
    ) -> AppResult<SiteWidget> {
        let instance = Self::instance(pool, site_id, instance_id).await?;

        let config = match &input.config {
            Some(patch) => {
                let merged =
                    widget_config::merge_config(&instance.widget_slug, &instance.config, patch)?;
                Some(widget_config::normalize(&instance.widget_slug, &merged)?)
            }
            None => None,
        };

        SiteWidgetRepo::update(
            pool,
            site_id,
            instance_id,
            config.as_ref(),
            input.is_visible,
            input.is_active,
        )
        .await?
        .ok_or_else(|| AppError::from(PlacementError::InstanceNotFound { id: instance_id }))
    }

    /// Show or hide an instance.
    pub async fn set_visibility(
        pool: &PgPool,
        site_id: DbId,
        instance_id: DbId,
        is_visible: bool,
    ) -> AppResult<SiteWidget> {
        let input = UpdateSiteWidget {
            is_visible: Some(is_visible),
            ..Default::default()
        };
        Self::update(pool, site_id, instance_id, &input).await
    }

    /// Enable or disable an instance.
    pub async fn set_active(
        pool: &PgPool,
        site_id: DbId,
        instance_id: DbId,
        is_active: bool,
    ) -> AppResult<SiteWidget> {
        let input = UpdateSiteWidget {
            is_active: Some(is_active),
            ..Default::default()
        };
        Self::update(pool, site_id, instance_id, &input).await
    }

    /// Delete an instance and close the gap it leaves.
    pub async fn delete(pool: &PgPool, site_id: DbId, instance_id: DbId) -> AppResult<()> {
        let site = Self::site(pool, site_id).await?;
        if !SiteWidgetRepo::delete(pool, site.id, instance_id).await? {
            return Err(PlacementError::InstanceNotFound { id: instance_id }.into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All instances of a site, by position then render order.
    pub async fn list_for_site(pool: &PgPool, site_id: DbId) -> AppResult<Vec<SiteWidget>> {
        let site = Self::site(pool, site_id).await?;
        Ok(SiteWidgetRepo::list_for_site(pool, site.id).await?)
    }

    /// Instances grouped by position, groups in the template's registry order.
    pub async fn grouped(
        pool: &PgPool,
        site_id: DbId,
    ) -> AppResult<IndexMap<String, Vec<SiteWidget>>> {
        let site = Self::site(pool, site_id).await?;
        let positions = WidgetPositionRepo::list_for_template(pool, site.template_id, true).await?;
        let registry: Vec<&str> = positions.iter().map(|p| p.slug.as_str()).collect();

        let instances = SiteWidgetRepo::list_for_site(pool, site.id).await?;
        Ok(placement::group_by_position(instances, &registry))
    }

    /// Instances as rendered for `audience`, in page order.
    ///
    /// Only active positions of the template render. Inactive instances are
    /// dropped; hidden ones are dropped for visitors and flagged as
    /// placeholders for editors.
    pub async fn rendered(
        pool: &PgPool,
        site_id: DbId,
        audience: RenderAudience,
    ) -> AppResult<Vec<RenderedSiteWidget>> {
        let site = Self::site(pool, site_id).await?;
        let positions = WidgetPositionRepo::list_for_template(pool, site.template_id, false).await?;
        let registry: Vec<&str> = positions.iter().map(|p| p.slug.as_str()).collect();

        let instances = SiteWidgetRepo::list_for_site(pool, site.id).await?;
        let mut groups = placement::group_by_position(instances, &registry);
        groups.retain(|slug, _| registry.contains(&slug.as_str()));

        let ordered: Vec<SiteWidget> = groups.into_values().flatten().collect();
        let rendered = render::renderable(ordered, audience)
            .into_iter()
            .map(|(widget, mode)| RenderedSiteWidget {
                widget,
                placeholder: mode == RenderMode::Placeholder,
            })
            .collect();
        Ok(rendered)
    }

    /// Required positions of the site's template holding no active instance.
    pub async fn missing_required(pool: &PgPool, site_id: DbId) -> AppResult<Vec<WidgetPosition>> {
        let site = Self::site(pool, site_id).await?;
        let positions = WidgetPositionRepo::list_for_template(pool, site.template_id, false).await?;
        let instances = SiteWidgetRepo::list_for_site(pool, site.id).await?;

        Ok(placement::missing_required_positions(&positions, &instances)
            .into_iter()
            .cloned()
            .collect())
    }
}
