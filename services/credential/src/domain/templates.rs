//! Fixed mail templates for the three kinds of notification the engine sends.

use crate::domain::types::Notification;

pub const OTP_SUBJECT: &str = "OTP Verification";
pub const ALERT_SUBJECT: &str = "Security Alert: Multiple Failed Login Attempts";
pub const PASSWORD_SUBJECT: &str = "New Password Notification";

pub fn otp_mail(recipient: &str, code: &str, unlock_url: &str) -> Notification {
    Notification {
        recipient: recipient.to_owned(),
        subject: OTP_SUBJECT.to_owned(),
        body: format!(
            "Your OTP is: {code}\n\
             Please enter the OTP to unlock the system.\n\
             LINK: {unlock_url}"
        ),
    }
}

pub fn alert_mail(recipient: &str) -> Notification {
    Notification {
        recipient: recipient.to_owned(),
        subject: ALERT_SUBJECT.to_owned(),
        body: "Dear User,\n\n\
               We have detected multiple failed login attempts on your system. \
               Specifically, your password was entered incorrectly more than 5 times.\n\n\
               For security reasons, please ensure your account is safe. If this activity \
               is not from you, we recommend changing your password immediately.\n\n\
               If you need assistance, please visit our support page or contact us directly.\n\n\
               Thank you for your attention.\n\n\
               Best regards,\n\
               Your Security Team"
            .to_owned(),
    }
}

pub fn password_mail(recipient: &str, password: &str, unlock_url: &str) -> Notification {
    Notification {
        recipient: recipient.to_owned(),
        subject: PASSWORD_SUBJECT.to_owned(),
        body: format!(
            "Dear User,\n\n\
             Your new password has been generated successfully.\n\n\
             Password: {password}\n\n\
             Use this password to unlock the system.\n\
             Access the system here: {unlock_url}\n\n\
             Best regards,\n\
             Your Support Team"
        ),
    }
}
