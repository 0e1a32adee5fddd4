pub mod fixtures;

#[cfg(test)]
mod access_tests;
#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod booking_tests;
#[cfg(test)]
mod lease_tests;
#[cfg(test)]
mod maintenance_tests;
#[cfg(test)]
mod notification_tests;
#[cfg(test)]
mod review_tests;
#[cfg(test)]
mod user_tests;
