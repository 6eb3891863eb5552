pub mod vcal;
