use leptos::*;
use leptos_meta::*;
use parking_meter::{
    connector, ParkingConfig, ParkingError, ParkingSession, PurchaseForm, QuoteInputs, QuotePlan,
};
use wasm_bindgen::prelude::*;

mod config;
mod rpc;
mod wallet;

use wallet::{BrowserWallet, EthereumQuery, EthereumSigner};

/// Page state, shared by every handler through a signal.
pub type Session = ParkingSession<EthereumQuery, EthereumSigner>;

/// Main application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let page = match config::load() {
        Ok(config) => view! { <ParkingPage config=config /> }.into_view(),
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            view! { <ConfigErrorPage error=e /> }.into_view()
        }
    };

    view! {
        <Html lang="en" />
        <Meta charset="utf-8" />
        <Meta name="viewport" content="width=device-width, initial-scale=1" />
        <Title text="Parking Meter" />
        <Stylesheet href="/style.css" />

        <main class="container">
            <h1>"Buy a Parking Ticket"</h1>
            {page}
        </main>
    }
}

/// Status line text for a build with unusable configuration.
pub fn config_error_text(error: &ParkingError) -> String {
    format!("Configuration error: {}", error)
}

/// Shown instead of the page when the build has no usable contract address.
/// There is nothing to connect to, so no connect button or form is rendered.
#[component]
pub fn ConfigErrorPage(error: ParkingError) -> impl IntoView {
    view! {
        <p id="status" class="status-text error-text">{config_error_text(&error)}</p>
    }
}

/// Connect button, purchase form and status line
#[component]
fn ParkingPage(config: ParkingConfig) -> impl IntoView {
    let session = create_rw_signal(Session::new(config));

    let (location, set_location) = create_signal(String::new());
    let (duration, set_duration) = create_signal(String::new());
    let (license_plate, set_license_plate) = create_signal(String::new());

    let connect = move |_| {
        log::info!("Connect Wallet button clicked");
        let poll_interval_ms = session.with_untracked(|s| s.config().confirmation_poll_interval_ms);
        spawn_local(async move {
            let result = connector::connect(&BrowserWallet::new(poll_interval_ms)).await;
            session.update(|s| s.apply_connection(result));
        });
    };

    // Each input change fires its own query; see ParkingSession::apply_quote
    // for how overlapping results are applied.
    let refresh_quote = move || {
        let inputs = QuoteInputs::new(location.get_untracked(), duration.get_untracked());
        if let Some(QuotePlan::Fetch(request)) = session.try_update(|s| s.plan_quote(&inputs)) {
            spawn_local(async move {
                let outcome = request.execute().await;
                session.update(|s| {
                    s.apply_quote(outcome);
                });
            });
        }
    };

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        log::info!("Buy Ticket button clicked");

        let form = PurchaseForm::new(
            location.get_untracked(),
            license_plate.get_untracked(),
            duration.get_untracked(),
        );
        let Some(Ok(request)) = session.try_update(|s| s.plan_purchase(&form)) else {
            return;
        };

        spawn_local(async move {
            let pending = match request.send().await {
                Ok(pending) => pending,
                Err(e) => {
                    session.update(|s| s.apply_purchase_failure(&e));
                    return;
                }
            };
            session.update(|s| s.apply_sent(pending.tx_hash()));

            match pending.confirm().await {
                Ok(hash) => session.update(|s| s.apply_confirmed(&hash)),
                Err(e) => session.update(|s| s.apply_purchase_failure(&e)),
            }
        });
    };

    view! {
        <div class="connect-row">
            <button id="connectButton" class="btn btn-primary" on:click=connect>
                {move || session.with(|s| s.connect_label())}
            </button>
            <Show when=move || session.with(|s| s.is_connected()) fallback=|| ()>
                <span class="wallet-address">
                    {move || session.with(|s| s.account_label().unwrap_or_default())}
                </span>
            </Show>
        </div>

        <div
            id="formContainer"
            class="form-container"
            style:display=move || if session.with(|s| s.form_visible()) { "block" } else { "none" }
        >
            <form id="parkingForm" on:submit=submit>
                <label for="locationId">"Location ID"</label>
                <input
                    id="locationId"
                    type="number"
                    class="input"
                    prop:value=move || location.get()
                    on:input=move |ev| {
                        set_location.set(event_target_value(&ev));
                        refresh_quote();
                    }
                />

                <label for="licensePlate">"License Plate"</label>
                <input
                    id="licensePlate"
                    type="text"
                    class="input"
                    prop:value=move || license_plate.get()
                    on:input=move |ev| set_license_plate.set(event_target_value(&ev))
                />

                <label for="timeInMinutes">"Time (minutes)"</label>
                <input
                    id="timeInMinutes"
                    type="number"
                    class="input"
                    prop:value=move || duration.get()
                    on:input=move |ev| {
                        set_duration.set(event_target_value(&ev));
                        refresh_quote();
                    }
                />

                <p id="calculatedAmount" class="amount">
                    {move || session.with(|s| s.amount_text())}
                </p>

                <button
                    id="buyButton"
                    type="submit"
                    class="btn btn-primary"
                    disabled=move || !session.with(|s| s.purchase_enabled())
                >
                    "Buy Ticket"
                </button>
            </form>
        </div>

        <p id="status" class="status-text">{move || session.with(|s| s.status_text())}</p>

        <Show when=move || session.with(|s| s.explorer_link().is_some()) fallback=|| ()>
            <a
                href=move || session.with(|s| s.explorer_link().unwrap_or_default())
                target="_blank"
                class="tx-link"
            >
                "View transaction"
            </a>
        </Show>
    }
}

/// Initialize the app
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    mount_to_body(|| view! { <App /> });
}
