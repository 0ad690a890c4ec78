//! HTTP surface: `GET /`, `POST /` and `POST /clear`.

use std::{convert::Infallible, net::SocketAddr};

use anyhow::Context;
use serde::Deserialize;
use warp::{
    Filter, Rejection, Reply,
    http::{StatusCode, Uri},
};
use weather_core::{StoreError, WeatherService};

use crate::render;

const MAX_FORM_BYTES: u64 = 16 * 1024;

#[derive(Debug, Deserialize)]
struct CityForm {
    city: String,
}

/// History table failure. Surfaces as a 500, never as a form error.
#[derive(Debug)]
struct StorageFault(String);

impl warp::reject::Reject for StorageFault {}

fn storage_fault(err: StoreError) -> Rejection {
    warp::reject::custom(StorageFault(err.to_string()))
}

/// All routes of the service, with rejections turned into plain responses.
pub fn routes(
    service: WeatherService,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_service = warp::any().map(move || service.clone());

    let index = warp::path::end().and(warp::get()).and(with_service.clone()).and_then(show_page);

    let submit = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<CityForm>())
        .and(with_service.clone())
        .and_then(submit_city);

    let clear = warp::path("clear")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_service)
        .and_then(clear_history);

    index.or(submit).or(clear).recover(handle_rejection).with(warp::trace::request())
}

async fn show_page(service: WeatherService) -> Result<impl Reply, Rejection> {
    let page = service.handle(None).await.map_err(storage_fault)?;
    Ok(warp::reply::html(render::page(&page)))
}

async fn submit_city(form: CityForm, service: WeatherService) -> Result<impl Reply, Rejection> {
    let page = service.handle(Some(&form.city)).await.map_err(storage_fault)?;
    Ok(warp::reply::html(render::page(&page)))
}

async fn clear_history(service: WeatherService) -> Result<impl Reply, Rejection> {
    service.clear_history().map_err(storage_fault)?;
    Ok(warp::redirect::see_other(Uri::from_static("/")))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(StorageFault(detail)) = err.find::<StorageFault>() {
        tracing::error!("Storage failure: {}", detail);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "Bad Request")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else {
        tracing::debug!("Unhandled rejection: {:?}", err);
        (StatusCode::BAD_REQUEST, "Bad Request")
    };

    Ok(warp::reply::with_status(message, status))
}

/// Run the service until Ctrl-C.
pub async fn serve(service: WeatherService, addr: SocketAddr) -> anyhow::Result<()> {
    let (bound, server) = warp::serve(routes(service))
        .try_bind_with_graceful_shutdown(addr, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutting down"),
                Err(e) => tracing::warn!("Failed to listen for Ctrl-C, shutting down: {}", e),
            }
        })
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use weather_core::{
        CurrentConditions, ForecastProvider, GeoMatch, Geocoder, LookupError, WeatherStore,
    };

    #[derive(Debug)]
    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, city: &str) -> Result<GeoMatch, LookupError> {
            match city {
                "paris" => Ok(GeoMatch { latitude: 48.85, longitude: 2.35, country: "France".into() }),
                "atlantis" => Ok(GeoMatch { latitude: 0.0, longitude: 0.0, country: "Ocean".into() }),
                _ => Err(LookupError::CityNotFound),
            }
        }
    }

    #[derive(Debug)]
    struct StubForecast;

    #[async_trait]
    impl ForecastProvider for StubForecast {
        async fn current(
            &self,
            latitude: f64,
            _longitude: f64,
        ) -> Result<CurrentConditions, LookupError> {
            if latitude == 0.0 {
                return Err(LookupError::WeatherUnavailable);
            }
            Ok(CurrentConditions {
                temperature: 15.2,
                windspeed: 10.0,
                weathercode: 3,
                time: "2024-01-01T12:00".into(),
            })
        }
    }

    fn service() -> (WeatherService, Arc<WeatherStore>) {
        let store = Arc::new(WeatherStore::in_memory().unwrap());
        let svc = WeatherService::new(Arc::new(StubGeocoder), Arc::new(StubForecast), store.clone());
        (svc, store)
    }

    fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> String {
        String::from_utf8_lossy(res.body()).into_owned()
    }

    async fn post_city(svc: &WeatherService, city: &str) -> warp::http::Response<warp::hyper::body::Bytes> {
        warp::test::request()
            .method("POST")
            .path("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(format!("city={city}"))
            .reply(&routes(svc.clone()))
            .await
    }

    #[tokio::test]
    async fn get_index_shows_empty_history() {
        let (svc, _) = service();

        let res = warp::test::request().method("GET").path("/").reply(&routes(svc)).await;

        assert_eq!(res.status(), StatusCode::OK);
        let html = body(&res);
        assert!(html.contains("No searches yet."));
        assert!(!html.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn post_city_renders_result_and_persists() {
        let (svc, store) = service();

        let res = post_city(&svc, "paris").await;

        assert_eq!(res.status(), StatusCode::OK);
        let html = body(&res);
        assert!(html.contains("<h2>Paris, France</h2>"));
        assert!(!html.contains("class=\"error\""));

        let rows = store.list_recent(5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].city, "Paris");
        assert_eq!(rows[0].description, "Code 3");
    }

    #[tokio::test]
    async fn post_unknown_city_renders_error_with_200() {
        let (svc, store) = service();

        let res = post_city(&svc, "zzzznotacity").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body(&res).contains("City not found!"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn post_without_weather_renders_error() {
        let (svc, store) = service();

        let res = post_city(&svc, "atlantis").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body(&res).contains("Weather data unavailable."));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn post_without_city_field_is_bad_request() {
        let (svc, _) = service();

        let res = warp::test::request()
            .method("POST")
            .path("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("town=paris")
            .reply(&routes(svc))
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clear_redirects_and_wipes_history() {
        let (svc, store) = service();
        post_city(&svc, "paris").await;
        post_city(&svc, "paris").await;
        assert_eq!(store.count().unwrap(), 2);

        let res = warp::test::request().method("POST").path("/clear").reply(&routes(svc)).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn get_clear_is_not_allowed() {
        let (svc, _) = service();

        let res = warp::test::request().method("GET").path("/clear").reply(&routes(svc)).await;

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (svc, _) = service();

        let res = warp::test::request().method("GET").path("/nope").reply(&routes(svc)).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn storage_failure_is_internal_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("weather.db");
        let store = Arc::new(WeatherStore::open(&db).unwrap());
        let svc = WeatherService::new(Arc::new(StubGeocoder), Arc::new(StubForecast), store);

        rusqlite::Connection::open(&db).unwrap().execute_batch("DROP TABLE weather;").unwrap();

        let res = warp::test::request().method("GET").path("/").reply(&routes(svc.clone())).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body(&res).contains("class=\"error\""));

        let res = post_city(&svc, "paris").await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body(&res).contains("class=\"error\""));

        let res = post_city(&svc, "zzzznotacity").await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = warp::test::request().method("POST").path("/clear").reply(&routes(svc)).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
