//! Schema definition and the resolvers behind every non-trivial field.
//!
//! Types are declared with async-graphql's dynamic builder. Plain fields
//! read straight off the parent value; resolver fields lower their own
//! selection into a [`FieldSelection`](crate::resolve::FieldSelection) and
//! hand it to the resolution functions.
//!
//! Every field backed by storage or the provider is nullable, so a failure
//! there nulls only that field. Mutation results are non-null: a failed
//! mutation nulls `data`.

use std::any::Any;
use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Schema, SchemaBuilder,
    SchemaError, TypeRef,
};
use async_graphql::{ErrorExtensions, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use wishlist_common::ClientId;
use wishlist_db::models::{Client, Movie, Profile};

use super::error::{log_failure, record_field_error, ErrorReporting};
use super::selection::current_selection;
use crate::config::GraphqlConfig;
use crate::metadata::{Network, SearchResult, TitleDetail, TitleId, TitleSource};
use crate::resolve::{
    resolve_detail, resolve_detail_by_id, resolve_similar_titles, ResolveError, ResolveResult,
};
use crate::services::Services;

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";
const CLIENT: &str = "Client";
const PROFILE: &str = "Profile";
const MOVIE: &str = "Movie";
const SEARCH_RESULT: &str = "TitleSearchResult";
const TITLE_DETAIL: &str = "TitleDetail";
const TITLE_SOURCE: &str = "TitleSource";
const NETWORK: &str = "Network";

/// Build the executable schema over `services`.
pub fn build_schema(services: Arc<Services>, config: &GraphqlConfig) -> Result<Schema, SchemaError> {
    schema_builder()
        .data(services)
        .limit_depth(config.max_depth)
        .limit_complexity(config.max_complexity)
        .extension(ErrorReporting)
        .finish()
}

/// SDL served at `/schema` and printed by `wishlist schema`.
pub fn sdl() -> Result<String, SchemaError> {
    Ok(schema_builder().finish()?.sdl())
}

fn schema_builder() -> SchemaBuilder {
    Schema::build(QUERY, Some(MUTATION), None)
        .register(query_type())
        .register(mutation_type())
        .register(client_type())
        .register(profile_type())
        .register(movie_type())
        .register(search_result_type())
        .register(title_detail_type())
        .register(title_source_type())
        .register(network_type())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// IDs go out as strings whatever their storage type.
fn id(value: impl ToString) -> Value {
    Value::String(value.to_string())
}

fn timestamp(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// A field read straight off a parent of type `T`.
fn plain<T, F>(name: &str, ty: TypeRef, read: F) -> Field
where
    T: Any + Send + Sync,
    F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
{
    Field::new(name, ty, move |ctx| {
        match ctx.parent_value.try_downcast_ref::<T>() {
            Ok(parent) => FieldFuture::from_value(read(parent)),
            Err(err) => FieldFuture::new(async move { Err::<Option<Value>, _>(err) }),
        }
    })
}

fn objects<'a, T: Any + Send + Sync>(items: Vec<T>) -> FieldValue<'a> {
    FieldValue::list(items.into_iter().map(FieldValue::owned_any))
}

fn services<'a>(ctx: &ResolverContext<'a>) -> async_graphql::Result<&'a Services> {
    Ok(ctx.data::<Arc<Services>>()?.as_ref())
}

/// An `ID` argument as text. Absent and `null` read as `None`.
fn id_argument(ctx: &ResolverContext<'_>, name: &str) -> ResolveResult<Option<String>> {
    let Some(value) = ctx.args.get(name) else {
        return Ok(None);
    };
    match value.as_value() {
        Value::Null => Ok(None),
        Value::String(raw) => Ok(Some(raw.clone())),
        Value::Number(raw) => Ok(Some(raw.to_string())),
        other => Err(ResolveError::invalid_argument(format!(
            "`{name}` must be an ID, got {other}"
        ))),
    }
}

fn required_id(ctx: &ResolverContext<'_>, name: &str) -> ResolveResult<String> {
    id_argument(ctx, name)?
        .ok_or_else(|| ResolveError::invalid_argument(format!("`{name}` is required")))
}

fn string_argument<'a>(ctx: &'a ResolverContext<'_>, name: &str) -> ResolveResult<&'a str> {
    ctx.args
        .get(name)
        .and_then(|value| value.string().ok())
        .ok_or_else(|| ResolveError::invalid_argument(format!("`{name}` must be a string")))
}

/// Mutation failures propagate so the non-null result nulls `data`.
fn reject(ctx: &ResolverContext<'_>, err: ResolveError) -> async_graphql::Error {
    log_failure(ctx.ctx, &err);
    err.extend()
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

fn query_type() -> Object {
    Object::new(QUERY)
        .field(Field::new("clients", TypeRef::named_nn_list(CLIENT), |ctx| {
            FieldFuture::new(async move {
                let clients = services(&ctx)?.clients.get_all().map_err(ResolveError::from);
                Ok(record_field_error(ctx.ctx, clients).map(objects))
            })
        }))
        .field(
            Field::new("clientById", TypeRef::named(CLIENT), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let client = required_id(&ctx, "id").and_then(|raw| {
                        services.clients.find_by_raw_id(&raw).map_err(ResolveError::from)
                    });
                    Ok(record_field_error(ctx.ctx, client)
                        .flatten()
                        .map(FieldValue::owned_any))
                })
            })
            .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID))),
        )
        .field(Field::new("profiles", TypeRef::named_nn_list(PROFILE), |ctx| {
            FieldFuture::new(async move {
                let profiles = services(&ctx)?.profiles.get_all().map_err(ResolveError::from);
                Ok(record_field_error(ctx.ctx, profiles).map(objects))
            })
        }))
        .field(
            Field::new("profileByName", TypeRef::named(PROFILE), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let profile = string_argument(&ctx, "name").and_then(|name| {
                        services.profiles.find_by_name(name).map_err(ResolveError::from)
                    });
                    Ok(record_field_error(ctx.ctx, profile)
                        .flatten()
                        .map(FieldValue::owned_any))
                })
            })
            .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING))),
        )
        .field(Field::new("movies", TypeRef::named_nn_list(MOVIE), |ctx| {
            FieldFuture::new(async move {
                let movies = services(&ctx)?.movies.get_all().map_err(ResolveError::from);
                Ok(record_field_error(ctx.ctx, movies).map(objects))
            })
        }))
        .field(
            Field::new("searchTitles", TypeRef::named_nn_list(SEARCH_RESULT), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let results = match string_argument(&ctx, "title") {
                        Ok(title) => services
                            .provider
                            .search(title)
                            .await
                            .map_err(|e| ResolveError::upstream(format!("search \"{title}\""), e)),
                        Err(err) => Err(err),
                    };
                    Ok(record_field_error(ctx.ctx, results).map(objects))
                })
            })
            .argument(InputValue::new("title", TypeRef::named_nn(TypeRef::STRING))),
        )
        .field(Field::new("networks", TypeRef::named_nn_list(NETWORK), |ctx| {
            FieldFuture::new(async move {
                let networks = services(&ctx)?
                    .provider
                    .list_networks()
                    .await
                    .map_err(|e| ResolveError::upstream("networks", e));
                Ok(record_field_error(ctx.ctx, networks).map(objects))
            })
        }))
        .field(
            Field::new("titleDetail", TypeRef::named(TITLE_DETAIL), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let selection = current_selection(ctx.ctx)?;
                    let id = required_id(&ctx, "id").and_then(|raw| {
                        raw.parse::<TitleId>().map_err(|_| {
                            ResolveError::invalid_argument(format!(
                                "title id '{raw}' is not a number"
                            ))
                        })
                    });
                    let detail = match id {
                        Ok(id) => {
                            resolve_detail_by_id(services.provider.as_ref(), id, &selection).await
                        }
                        Err(err) => Err(err),
                    };
                    Ok(record_field_error(ctx.ctx, detail).map(FieldValue::owned_any))
                })
            })
            .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID))),
        )
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

fn mutation_type() -> Object {
    Object::new(MUTATION)
        .field(
            Field::new("createClient", TypeRef::named_nn(CLIENT), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let client = string_argument(&ctx, "name").and_then(|name| {
                        let email = string_argument(&ctx, "email")?;
                        Ok(services.clients.create(name, email)?)
                    });
                    match client {
                        Ok(client) => Ok(Some(FieldValue::owned_any(client))),
                        Err(err) => Err(reject(&ctx, err)),
                    }
                })
            })
            .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING)))
            .argument(InputValue::new("email", TypeRef::named_nn(TypeRef::STRING))),
        )
        .field(
            Field::new("createProfile", TypeRef::named_nn(PROFILE), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let profile = required_id(&ctx, "clientId").and_then(|raw| {
                        let client_id: ClientId = raw.parse()?;
                        let name = string_argument(&ctx, "name")?;
                        Ok(services.profiles.create(client_id, name)?)
                    });
                    match profile {
                        Ok(profile) => Ok(Some(FieldValue::owned_any(profile))),
                        Err(err) => Err(reject(&ctx, err)),
                    }
                })
            })
            .argument(InputValue::new("clientId", TypeRef::named_nn(TypeRef::ID)))
            .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING))),
        )
        .field(
            Field::new("createMovie", TypeRef::named_nn(MOVIE), |ctx| {
                FieldFuture::new(async move {
                    let services = services(&ctx)?;
                    let movie = string_argument(&ctx, "title").and_then(|title| {
                        let watchmode_id = id_argument(&ctx, "watchmodeId")?
                            .map(|raw| {
                                raw.parse::<i64>().map_err(|_| {
                                    ResolveError::invalid_argument(format!(
                                        "watchmode id '{raw}' is not a number"
                                    ))
                                })
                            })
                            .transpose()?;
                        Ok(services.movies.create(title, watchmode_id)?)
                    });
                    match movie {
                        Ok(movie) => Ok(Some(FieldValue::owned_any(movie))),
                        Err(err) => Err(reject(&ctx, err)),
                    }
                })
            })
            .argument(InputValue::new("title", TypeRef::named_nn(TypeRef::STRING)))
            .argument(InputValue::new("watchmodeId", TypeRef::named(TypeRef::ID))),
        )
}

// ---------------------------------------------------------------------------
// Local records
// ---------------------------------------------------------------------------

fn client_type() -> Object {
    Object::new(CLIENT)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |c: &Client| Some(id(c.id))))
        .field(plain("name", TypeRef::named_nn(TypeRef::STRING), |c: &Client| {
            Some(Value::from(c.name.as_str()))
        }))
        .field(plain("email", TypeRef::named_nn(TypeRef::STRING), |c: &Client| {
            Some(Value::from(c.email.as_str()))
        }))
        .field(plain("createdAt", TypeRef::named_nn(TypeRef::STRING), |c: &Client| {
            Some(timestamp(&c.created_at))
        }))
        .field(Field::new("profiles", TypeRef::named_nn_list(PROFILE), |ctx| {
            FieldFuture::new(async move {
                let client = ctx.parent_value.try_downcast_ref::<Client>()?;
                let profiles = services(&ctx)?
                    .profiles
                    .find_by_client(client.id)
                    .map_err(ResolveError::from);
                Ok(record_field_error(ctx.ctx, profiles).map(objects))
            })
        }))
}

fn profile_type() -> Object {
    Object::new(PROFILE)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |p: &Profile| Some(id(p.id))))
        .field(plain("clientId", TypeRef::named_nn(TypeRef::ID), |p: &Profile| {
            Some(id(p.client_id))
        }))
        .field(plain("name", TypeRef::named_nn(TypeRef::STRING), |p: &Profile| {
            Some(Value::from(p.name.as_str()))
        }))
        .field(plain("createdAt", TypeRef::named_nn(TypeRef::STRING), |p: &Profile| {
            Some(timestamp(&p.created_at))
        }))
        .field(Field::new("client", TypeRef::named(CLIENT), |ctx| {
            FieldFuture::new(async move {
                let profile = ctx.parent_value.try_downcast_ref::<Profile>()?;
                let client = services(&ctx)?
                    .clients
                    .find_by_id(profile.client_id)
                    .map_err(ResolveError::from);
                Ok(record_field_error(ctx.ctx, client)
                    .flatten()
                    .map(FieldValue::owned_any))
            })
        }))
}

fn movie_type() -> Object {
    Object::new(MOVIE)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |m: &Movie| Some(id(m.id))))
        .field(plain("title", TypeRef::named_nn(TypeRef::STRING), |m: &Movie| {
            Some(Value::from(m.title.as_str()))
        }))
        .field(plain("watchmodeId", TypeRef::named(TypeRef::ID), |m: &Movie| {
            m.watchmode_id.map(id)
        }))
        .field(plain("createdAt", TypeRef::named_nn(TypeRef::STRING), |m: &Movie| {
            Some(timestamp(&m.created_at))
        }))
}

// ---------------------------------------------------------------------------
// Provider records
// ---------------------------------------------------------------------------

fn search_result_type() -> Object {
    Object::new(SEARCH_RESULT)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |r: &SearchResult| {
            Some(id(r.id))
        }))
        .field(plain("name", TypeRef::named_nn(TypeRef::STRING), |r: &SearchResult| {
            Some(Value::from(r.name.as_str()))
        }))
        .field(plain("type", TypeRef::named(TypeRef::STRING), |r: &SearchResult| {
            r.kind.clone().map(Value::from)
        }))
        .field(plain("year", TypeRef::named(TypeRef::INT), |r: &SearchResult| {
            r.year.map(Value::from)
        }))
        .field(plain("tmdbId", TypeRef::named(TypeRef::INT), |r: &SearchResult| {
            r.tmdb_id.map(Value::from)
        }))
        .field(plain("tmdbType", TypeRef::named(TypeRef::STRING), |r: &SearchResult| {
            r.tmdb_type.clone().map(Value::from)
        }))
        .field(plain("imageUrl", TypeRef::named(TypeRef::STRING), |r: &SearchResult| {
            r.image_url.clone().map(Value::from)
        }))
        .field(Field::new("details", TypeRef::named(TITLE_DETAIL), |ctx| {
            FieldFuture::new(async move {
                let result = ctx.parent_value.try_downcast_ref::<SearchResult>()?;
                let provider = services(&ctx)?.provider.as_ref();
                let selection = current_selection(ctx.ctx)?;
                let detail = resolve_detail(provider, result, &selection).await;
                Ok(record_field_error(ctx.ctx, detail).map(FieldValue::owned_any))
            })
        }))
}

fn title_detail_type() -> Object {
    Object::new(TITLE_DETAIL)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |d: &TitleDetail| {
            Some(id(d.id))
        }))
        .field(plain("title", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.title.clone().map(Value::from)
        }))
        .field(plain("type", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.kind.clone().map(Value::from)
        }))
        .field(plain("year", TypeRef::named(TypeRef::INT), |d: &TitleDetail| {
            d.year.map(Value::from)
        }))
        .field(plain("tmdbId", TypeRef::named(TypeRef::INT), |d: &TitleDetail| {
            d.tmdb_id.map(Value::from)
        }))
        .field(plain("tmdbType", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.tmdb_type.clone().map(Value::from)
        }))
        .field(plain("poster", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.poster.clone().map(Value::from)
        }))
        .field(plain("plotOverview", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.plot_overview.clone().map(Value::from)
        }))
        .field(plain("runtimeMinutes", TypeRef::named(TypeRef::INT), |d: &TitleDetail| {
            d.runtime_minutes.map(Value::from)
        }))
        .field(plain("releaseDate", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.release_date.clone().map(Value::from)
        }))
        .field(plain("genreNames", TypeRef::named_nn_list(TypeRef::STRING), |d: &TitleDetail| {
            d.genre_names.clone().map(Value::from)
        }))
        .field(plain("userRating", TypeRef::named(TypeRef::FLOAT), |d: &TitleDetail| {
            d.user_rating.map(Value::from)
        }))
        .field(plain("criticScore", TypeRef::named(TypeRef::INT), |d: &TitleDetail| {
            d.critic_score.map(Value::from)
        }))
        .field(plain("usRating", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.us_rating.clone().map(Value::from)
        }))
        .field(plain("originalLanguage", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.original_language.clone().map(Value::from)
        }))
        .field(plain("imdbId", TypeRef::named(TypeRef::STRING), |d: &TitleDetail| {
            d.imdb_id.clone().map(Value::from)
        }))
        .field(plain("similarTitlesIds", TypeRef::named_nn_list(TypeRef::ID), |d: &TitleDetail| {
            d.similar_titles_ids
                .as_ref()
                .map(|ids| Value::List(ids.iter().map(id).collect()))
        }))
        .field(Field::new("similarTitles", TypeRef::named_nn_list(TITLE_DETAIL), |ctx| {
            FieldFuture::new(async move {
                let detail = ctx.parent_value.try_downcast_ref::<TitleDetail>()?;
                let Some(ids) = detail.similar_titles_ids.as_deref() else {
                    return Ok(None);
                };
                let services = services(&ctx)?;
                let selection = current_selection(ctx.ctx)?;
                let details = resolve_similar_titles(
                    services.provider.as_ref(),
                    ids,
                    &selection,
                    services.settings.similar_titles_concurrency,
                )
                .await;
                Ok(record_field_error(ctx.ctx, details).map(objects))
            })
        }))
        .field(Field::new("sources", TypeRef::named_nn_list(TITLE_SOURCE), |ctx| {
            FieldFuture::new(async move {
                let detail = ctx.parent_value.try_downcast_ref::<TitleDetail>()?;
                Ok(detail.sources.clone().map(objects))
            })
        }))
}

fn title_source_type() -> Object {
    Object::new(TITLE_SOURCE)
        .field(plain("sourceId", TypeRef::named_nn(TypeRef::ID), |s: &TitleSource| {
            Some(id(s.source_id))
        }))
        .field(plain("name", TypeRef::named_nn(TypeRef::STRING), |s: &TitleSource| {
            Some(Value::from(s.name.as_str()))
        }))
        .field(plain("type", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.kind.clone().map(Value::from)
        }))
        .field(plain("region", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.region.clone().map(Value::from)
        }))
        .field(plain("webUrl", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.web_url.clone().map(Value::from)
        }))
        .field(plain("iosUrl", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.ios_url.clone().map(Value::from)
        }))
        .field(plain("androidUrl", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.android_url.clone().map(Value::from)
        }))
        .field(plain("format", TypeRef::named(TypeRef::STRING), |s: &TitleSource| {
            s.format.clone().map(Value::from)
        }))
        .field(plain("price", TypeRef::named(TypeRef::FLOAT), |s: &TitleSource| {
            s.price.map(Value::from)
        }))
        .field(plain("seasons", TypeRef::named(TypeRef::INT), |s: &TitleSource| {
            s.seasons.map(Value::from)
        }))
        .field(plain("episodes", TypeRef::named(TypeRef::INT), |s: &TitleSource| {
            s.episodes.map(Value::from)
        }))
}

fn network_type() -> Object {
    Object::new(NETWORK)
        .field(plain("id", TypeRef::named_nn(TypeRef::ID), |n: &Network| Some(id(n.id))))
        .field(plain("name", TypeRef::named_nn(TypeRef::STRING), |n: &Network| {
            Some(Value::from(n.name.as_str()))
        }))
        .field(plain("originCountry", TypeRef::named(TypeRef::STRING), |n: &Network| {
            n.origin_country.clone().map(Value::from)
        }))
        .field(plain("tmdbId", TypeRef::named(TypeRef::INT), |n: &Network| {
            n.tmdb_id.map(Value::from)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The SDL line declaring `field` on `type_name`, trimmed.
    fn field_line(sdl: &str, type_name: &str, field: &str) -> String {
        let block = sdl
            .split(&format!("type {type_name} {{"))
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap_or_else(|| panic!("no SDL block for {type_name}"));
        block
            .lines()
            .map(str::trim)
            .find(|line| {
                line.strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with(':') || rest.starts_with('('))
            })
            .unwrap_or_else(|| panic!("{field} missing from SDL type {type_name}"))
            .to_string()
    }

    #[test]
    fn sdl_declares_both_roots() {
        let sdl = sdl().unwrap();
        assert!(sdl.contains("type Query {"));
        assert!(sdl.contains("type Mutation {"));
    }

    #[test]
    fn fields_that_can_fail_are_nullable() {
        let sdl = sdl().unwrap();
        assert_eq!(field_line(&sdl, SEARCH_RESULT, "details"), "details: TitleDetail");
        assert_eq!(
            field_line(&sdl, TITLE_DETAIL, "similarTitles"),
            "similarTitles: [TitleDetail!]"
        );
        assert_eq!(field_line(&sdl, CLIENT, "profiles"), "profiles: [Profile!]");
        assert_eq!(field_line(&sdl, QUERY, "networks"), "networks: [Network!]");
        assert_eq!(
            field_line(&sdl, QUERY, "titleDetail"),
            "titleDetail(id: ID!): TitleDetail"
        );
    }

    #[test]
    fn mutation_results_and_ids_are_non_null() {
        let sdl = sdl().unwrap();
        assert_eq!(
            field_line(&sdl, MUTATION, "createClient"),
            "createClient(name: String!, email: String!): Client!"
        );
        assert_eq!(field_line(&sdl, TITLE_DETAIL, "id"), "id: ID!");
        assert_eq!(field_line(&sdl, MOVIE, "watchmodeId"), "watchmodeId: ID");
        assert_eq!(field_line(&sdl, TITLE_SOURCE, "sourceId"), "sourceId: ID!");
    }

    #[test]
    fn ids_render_as_text() {
        assert_eq!(id(TitleId::new(42)), Value::String("42".into()));
        assert_eq!(id(ClientId::from(7)), Value::String("7".into()));
    }
}
