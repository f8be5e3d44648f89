//! Redirect page rendering.
//!
//! The customer's browser carries the signed field set to the bank as a
//! form POST. The page auto-submits after a short delay and keeps a
//! visible submit button and a cancel link for browsers without script.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::request::PaymentRequest;
use super::IPG_URL;

/// Auto-submitting form carrying the outbound payment request
pub fn render_redirect_form(request: &PaymentRequest) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Redirecting to payment" }
            }
            body style="background-color: #ffffff; padding: 20px; font-family: Arial, Helvetica, Sans-Serif;" {
                h3 style="text-align: center;" {
                    "Please wait while we redirect you to the secure payment page..."
                }
                form #ipg_payment_form action=(IPG_URL) method="post" {
                    @for (field, value) in request.fields() {
                        input type="hidden" name=(field) value=(value);
                    }
                    p style="text-align: center;" {
                        input type="submit" class="button button-primary" value="Proceed to payment";
                        " "
                        a class="cancel" href=(request.cancel_url) { "Cancel and return" }
                    }
                }
                (PreEscaped(r#"<script type="text/javascript"> var frm = document.getElementById("ipg_payment_form"); window.setTimeout(function () { frm.submit(); }, 300); </script>"#))
            }
        }
    }
}

/// Interstitial shown before sending the customer back after a failed
/// or declined payment
pub fn render_notice_page(notice: &str, redirect_url: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta http-equiv="refresh" content={ "5;url=" (redirect_url) };
                title { "Payment not completed" }
            }
            body style="background-color: #ffffff; padding: 20px; font-family: Arial, Helvetica, Sans-Serif;" {
                h3 { "Payment not completed" }
                p { (notice) }
                p {
                    a href=(redirect_url) { "Return to the payment page" }
                }
            }
        }
    }
}
